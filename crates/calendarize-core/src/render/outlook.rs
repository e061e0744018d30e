//! Outlook.com compose deep link.
//!
//! Outlook expects timed events as UTC instants and percent-encoded text.

use super::{DeepLink, QueryEncoding};
use crate::event::EventRecord;
use crate::recurrence::rrule_string;
use crate::time::iso_utc;

const OUTLOOK_COMPOSE_URL: &str =
    "https://outlook.live.com/owa/?path=/calendar/action/compose&rru=addevent";

/// Builds the Outlook.com "add event" link for a record.
///
/// All-day events carry local `YYYY-MM-DD` dates and `allday=true`, since a
/// UTC conversion could move them to another day.
pub fn outlook_link(record: &EventRecord) -> String {
    let (start, end) = if record.is_all_day() {
        (
            record.start_time().format("%Y-%m-%d").to_string(),
            record.end_time().format("%Y-%m-%d").to_string(),
        )
    } else {
        (iso_utc(&record.start_time()), iso_utc(&record.end_time()))
    };
    let to = (!record.attendees().is_empty()).then(|| record.attendees().join(","));
    let recurrence = rrule_string(record);

    let mut link = DeepLink::new(OUTLOOK_COMPOSE_URL, QueryEncoding::Percent)
        .param("subject", record.title())
        .raw("startdt", &start)
        .raw("enddt", &end);
    if record.is_all_day() {
        link = link.raw("allday", "true");
    }
    link.param_opt("body", record.description())
        .param_opt("location", record.location())
        .param_opt("to", to.as_deref())
        .param_opt("recurrence", recurrence.as_deref())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Frequency, Recurrence};
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Tz;

    fn la() -> Tz {
        "America/Los_Angeles".parse().unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        la().with_ymd_and_hms(2025, 6, d, h, m, 0).unwrap()
    }

    #[test]
    fn timed_event_uses_utc() {
        let record = EventRecord::new("Team Sync", at(2, 15, 0), None);
        insta::assert_snapshot!(outlook_link(&record), @"https://outlook.live.com/owa/?path=/calendar/action/compose&rru=addevent&subject=Team%20Sync&startdt=2025-06-02T22:00:00Z&enddt=2025-06-02T23:00:00Z");
    }

    #[test]
    fn utc_conversion_crosses_midnight() {
        let record = EventRecord::new("Late", at(2, 20, 0), Some(at(2, 21, 30)));
        let link = outlook_link(&record);
        assert!(link.contains("&startdt=2025-06-03T03:00:00Z&enddt=2025-06-03T04:30:00Z"), "{link}");
    }

    #[test]
    fn all_day_keeps_local_dates() {
        let record = EventRecord::all_day("Offsite", at(2, 0, 0), Some(at(3, 0, 0)));
        let link = outlook_link(&record);
        assert!(
            link.contains("&startdt=2025-06-02&enddt=2025-06-03&allday=true"),
            "{link}"
        );
    }

    #[test]
    fn text_is_percent_encoded() {
        let record = EventRecord::new("Lunch", at(2, 12, 0), None)
            .with_description("Bring a laptop")
            .with_location("Cafe")
            .with_attendees(["ann@example.com", "bo@example.com"])
            .with_recurrence(Recurrence::new(Frequency::Daily).with_count(3));
        let link = outlook_link(&record);
        assert!(link.contains("&body=Bring%20a%20laptop"), "{link}");
        assert!(link.contains("&location=Cafe"), "{link}");
        assert!(link.contains("&to=ann%40example.com%2Cbo%40example.com"), "{link}");
        assert!(
            link.ends_with("&recurrence=RRULE%3AFREQ%3DDAILY%3BCOUNT%3D3"),
            "{link}"
        );
        assert!(!link.contains('+'));
    }

    #[test]
    fn non_recurring_has_no_recurrence() {
        let record = EventRecord::new("Once", at(2, 9, 0), None);
        assert!(!outlook_link(&record).contains("recurrence="));
    }
}
