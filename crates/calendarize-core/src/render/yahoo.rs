//! Yahoo Calendar deep link.

use tracing::debug;

use super::{DeepLink, QueryEncoding};
use crate::event::EventRecord;
use crate::recurrence::rrule_string;
use crate::time::{compact_date, compact_local};

const YAHOO_COMPOSE_URL: &str = "https://calendar.yahoo.com/?v=60";

/// Builds the Yahoo Calendar "add event" link for a record.
///
/// Times are the record's local wall-clock values. Yahoo has no attendee
/// parameter, so attendees are left out.
pub fn yahoo_link(record: &EventRecord) -> String {
    if !record.attendees().is_empty() {
        debug!(
            attendees = record.attendees().len(),
            "yahoo links cannot carry attendees, omitting them"
        );
    }

    let (start, end) = if record.is_all_day() {
        (
            compact_date(&record.start_time()),
            compact_date(&record.end_time()),
        )
    } else {
        (
            compact_local(&record.start_time()),
            compact_local(&record.end_time()),
        )
    };
    let rule = rrule_string(record);

    let mut link = DeepLink::new(YAHOO_COMPOSE_URL, QueryEncoding::Form)
        .param("title", record.title())
        .raw("st", &start)
        .raw("et", &end);
    if record.is_all_day() {
        link = link.raw("dur", "allday");
    }
    link.param_opt("desc", record.description())
        .param_opt("in_loc", record.location())
        .param_opt("rr", rule.as_deref())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Frequency, Recurrence, Weekday};
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Tz;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        chrono_tz::Europe::Paris
            .with_ymd_and_hms(2025, 6, d, h, m, 0)
            .unwrap()
    }

    #[test]
    fn timed_event_keeps_local_time() {
        let record = EventRecord::new("Team Sync", at(2, 15, 0), None);
        insta::assert_snapshot!(yahoo_link(&record), @"https://calendar.yahoo.com/?v=60&title=Team+Sync&st=20250602T150000&et=20250602T160000");
    }

    #[test]
    fn all_day_event() {
        let record = EventRecord::all_day("Offsite", at(2, 0, 0), Some(at(3, 0, 0)))
            .with_location("Le Lodge");
        insta::assert_snapshot!(yahoo_link(&record), @"https://calendar.yahoo.com/?v=60&title=Offsite&st=20250602&et=20250603&dur=allday&in_loc=Le+Lodge");
    }

    #[test]
    fn attendees_are_omitted() {
        let record = EventRecord::new("Review", at(2, 10, 0), None)
            .with_attendees(["ann@example.com"]);
        let link = yahoo_link(&record);
        assert!(!link.contains("ann"), "{link}");
    }

    #[test]
    fn recurrence_rule() {
        let record = EventRecord::new("Standup", at(2, 9, 0), None)
            .with_description("Daily check-in")
            .with_recurrence(
                Recurrence::new(Frequency::Weekly).with_days([Weekday::Tuesday]),
            );
        let link = yahoo_link(&record);
        assert!(link.contains("&desc=Daily+check-in&"), "{link}");
        assert!(link.ends_with("&rr=RRULE%3AFREQ%3DWEEKLY%3BBYDAY%3DTU"), "{link}");
    }

    #[test]
    fn non_recurring_has_no_rule() {
        let record = EventRecord::new("Once", at(2, 9, 0), None);
        assert!(!yahoo_link(&record).contains("rr="));
    }
}
