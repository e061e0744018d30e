//! Google Calendar renderers.
//!
//! [`google_link`] builds the `action=TEMPLATE` deep link. Times are local
//! wall-clock values and the zone is passed separately as `ctz`.
//! [`google_api_event`] builds the JSON body accepted by the Calendar API's
//! `events.insert`; sending it is up to the host.

use serde_json::{Map, Value, json};

use super::{DeepLink, QueryEncoding, RenderError, exclusive_end_date};
use crate::event::EventRecord;
use crate::recurrence::rrule_string;
use crate::time::{compact_date, compact_local};

const GOOGLE_TEMPLATE_URL: &str = "https://www.google.com/calendar/render?action=TEMPLATE";

/// Builds the Google Calendar "add event" link for a record.
pub fn google_link(record: &EventRecord) -> String {
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
    let recur = rrule_string(record);

    DeepLink::new(GOOGLE_TEMPLATE_URL, QueryEncoding::Form)
        .param("text", record.title())
        .raw("dates", &format!("{}/{}", start, end))
        .param_opt("details", record.description())
        .param_opt("location", record.location())
        .list("add", record.attendees())
        .param("ctz", record.time_zone().name())
        .param_opt("recur", recur.as_deref())
        .finish()
}

/// Builds a Calendar API event resource for a record.
///
/// All-day events use `date` values with an exclusive end, timed events use
/// `dateTime` plus `timeZone`.
pub fn google_api_event(record: &EventRecord) -> Result<Value, RenderError> {
    let zone = record.time_zone().name();
    let (start, end) = if record.is_all_day() {
        let last = exclusive_end_date(record)?;
        (
            json!({ "date": record.start_time().format("%Y-%m-%d").to_string() }),
            json!({ "date": last.format("%Y-%m-%d").to_string() }),
        )
    } else {
        (
            json!({ "dateTime": record.start_time().to_rfc3339(), "timeZone": zone }),
            json!({ "dateTime": record.end_time().to_rfc3339(), "timeZone": zone }),
        )
    };

    let mut body = Map::new();
    body.insert("summary".into(), json!(record.title()));
    if let Some(description) = record.description() {
        body.insert("description".into(), json!(description));
    }
    if let Some(location) = record.location() {
        body.insert("location".into(), json!(location));
    }
    body.insert("start".into(), start);
    body.insert("end".into(), end);
    if !record.attendees().is_empty() {
        let attendees = record
            .attendees()
            .iter()
            .map(|email| json!({ "email": email }))
            .collect::<Vec<_>>();
        body.insert("attendees".into(), Value::Array(attendees));
    }
    if let Some(rule) = rrule_string(record) {
        body.insert("recurrence".into(), json!([rule]));
    }
    Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Frequency, Recurrence, Weekday};
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Tz;

    fn la() -> Tz {
        "America/Los_Angeles".parse().unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        la().with_ymd_and_hms(2025, 6, d, h, m, 0).unwrap()
    }

    mod link {
        use super::*;

        #[test]
        fn timed_event() {
            let record = EventRecord::new("Team Sync", at(2, 15, 0), Some(at(2, 15, 0)));
            insta::assert_snapshot!(google_link(&record), @"https://www.google.com/calendar/render?action=TEMPLATE&text=Team+Sync&dates=20250602T150000/20250602T160000&ctz=America%2FLos_Angeles");
        }

        #[test]
        fn all_day_uses_bare_dates() {
            let record = EventRecord::all_day("Offsite", at(2, 0, 0), Some(at(4, 0, 0)));
            let link = google_link(&record);
            assert!(link.contains("&dates=20250602/20250604&"), "{link}");
        }

        #[test]
        fn optional_fields_are_form_encoded() {
            let record = EventRecord::new("Lunch & Learn", at(2, 12, 0), None)
                .with_description("Bring a laptop")
                .with_location("Room 4/B")
                .with_attendees(["ann@example.com", "bo@example.com"]);
            insta::assert_snapshot!(google_link(&record), @"https://www.google.com/calendar/render?action=TEMPLATE&text=Lunch+%26+Learn&dates=20250602T120000/20250602T130000&details=Bring+a+laptop&location=Room+4%2FB&add=ann%40example.com,bo%40example.com&ctz=America%2FLos_Angeles");
        }

        #[test]
        fn zone_name_survives_form_decoding() {
            let tz: Tz = "Etc/GMT+5".parse().unwrap();
            let start = tz.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
            let link = google_link(&EventRecord::new("Call", start, None));
            assert!(link.ends_with("&ctz=Etc%2FGMT%2B5"), "{link}");

            let (_, query) = link.split_once('?').unwrap();
            let ctz = url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "ctz")
                .map(|(_, value)| value.into_owned());
            assert_eq!(ctz.as_deref(), Some("Etc/GMT+5"));
        }

        #[test]
        fn recurring_event_has_recur() {
            let record = EventRecord::new("Standup", at(2, 9, 0), None).with_recurrence(
                Recurrence::new(Frequency::Weekly)
                    .with_days([Weekday::Monday, Weekday::Wednesday])
                    .with_count(10),
            );
            let link = google_link(&record);
            assert!(
                link.ends_with("&recur=RRULE%3AFREQ%3DWEEKLY%3BBYDAY%3DMO%2CWE%3BCOUNT%3D10"),
                "{link}"
            );
        }

        #[test]
        fn non_recurring_has_no_recur() {
            let record = EventRecord::new("Once", at(2, 9, 0), None);
            assert!(!google_link(&record).contains("recur="));
        }
    }

    mod api_body {
        use super::*;

        #[test]
        fn timed_event() {
            let record = EventRecord::new("Team Sync", at(2, 15, 0), None)
                .with_attendees(["ann@example.com"]);
            let body = google_api_event(&record).unwrap();
            assert_eq!(
                body,
                json!({
                    "summary": "Team Sync",
                    "start": { "dateTime": "2025-06-02T15:00:00-07:00", "timeZone": "America/Los_Angeles" },
                    "end": { "dateTime": "2025-06-02T16:00:00-07:00", "timeZone": "America/Los_Angeles" },
                    "attendees": [{ "email": "ann@example.com" }],
                })
            );
        }

        #[test]
        fn all_day_end_is_exclusive() {
            let record = EventRecord::all_day("Offsite", at(2, 0, 0), Some(at(3, 0, 0)))
                .with_location("Lodge")
                .with_recurrence(Recurrence::new(Frequency::Yearly));
            let body = google_api_event(&record).unwrap();
            assert_eq!(body["start"], json!({ "date": "2025-06-02" }));
            assert_eq!(body["end"], json!({ "date": "2025-06-04" }));
            assert_eq!(body["location"], "Lodge");
            assert_eq!(body["recurrence"], json!(["RRULE:FREQ=YEARLY"]));
            assert!(body.get("description").is_none());
        }
    }
}
