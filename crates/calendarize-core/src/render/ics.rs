//! iCalendar (RFC 5545) document rendering.
//!
//! The `VEVENT` is built with the `icalendar` crate. The crate has no
//! `VTIMEZONE` support, so the zone definition is generated here and spliced
//! in ahead of the event. Its offsets are sampled on January 1 and July 1 of
//! the event's start year: one `STANDARD` block when they agree, a
//! `STANDARD`/`DAYLIGHT` pair when they differ.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use super::{RenderError, RenderOptions, exclusive_end_date};
use crate::event::EventRecord;
use crate::recurrence::rrule_property;
use crate::time::{UtcOffset, compact_local, compact_utc};

const NO_LOCATION: &str = "No Location";
const NO_DESCRIPTION: &str = "No Description";

const STANDARD_ANCHOR: &str = "19700101T000000";
const DAYLIGHT_ANCHOR: &str = "19700701T000000";

/// Renders a record as a complete calendar document with CRLF line endings.
pub fn ics_document(record: &EventRecord, options: &RenderOptions) -> Result<String, RenderError> {
    let tz = record.time_zone();
    let timezone = vtimezone(tz, record.start_time().year())?;

    let mut event = icalendar::Event::new();
    event.uid(record.uid());
    event.add_property("DTSTAMP", compact_utc(&options.generated_at));
    event.summary(record.title());

    if record.is_all_day() {
        let end = exclusive_end_date(record)?;
        event.append_property(date_property("DTSTART", record.start_time().date_naive()));
        event.append_property(date_property("DTEND", end));
    } else {
        event.append_property(zoned_property("DTSTART", &record.start_time()));
        event.append_property(zoned_property("DTEND", &record.end_time()));
    }

    event.location(record.location().unwrap_or(NO_LOCATION));
    event.description(record.description().unwrap_or(NO_DESCRIPTION));

    for email in record.attendees() {
        event.append_multi_property(Property::new("ATTENDEE", format!("mailto:{}", email)));
    }

    if let Some(rule) = rrule_property(record) {
        event.append_property(rule);
    }

    let mut calendar = Calendar::new();
    calendar.push(event.done());
    let calendar = calendar.done();

    Ok(finish_document(
        &calendar.to_string(),
        &options.prodid,
        &timezone,
    ))
}

fn date_property(name: &str, date: NaiveDate) -> Property {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    prop
}

fn zoned_property(name: &str, dt: &chrono::DateTime<Tz>) -> Property {
    let mut prop = Property::new(name, compact_local(dt));
    prop.add_parameter("TZID", dt.timezone().name());
    prop
}

/// Builds the `VTIMEZONE` lines for `tz` as observed in `year`.
fn vtimezone(tz: Tz, year: i32) -> Result<Vec<String>, RenderError> {
    let sample = |month: u32| {
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(RenderError::DateOutOfRange {
                field: "start_time",
            })
    };
    let january = sample(1)?;
    let july = sample(7)?;
    let winter = UtcOffset::at(tz, &january);
    let summer = UtcOffset::at(tz, &july);

    let mut lines = vec!["BEGIN:VTIMEZONE".to_string(), format!("TZID:{}", tz.name())];
    if winter == summer {
        push_observance(
            &mut lines,
            "STANDARD",
            STANDARD_ANCHOR,
            (winter, winter),
            &abbreviation(tz, &january),
        );
    } else {
        let (standard, standard_at, daylight, daylight_at) = if winter < summer {
            (winter, january, summer, july)
        } else {
            (summer, july, winter, january)
        };
        push_observance(
            &mut lines,
            "STANDARD",
            STANDARD_ANCHOR,
            (daylight, standard),
            &abbreviation(tz, &standard_at),
        );
        push_observance(
            &mut lines,
            "DAYLIGHT",
            DAYLIGHT_ANCHOR,
            (standard, daylight),
            &abbreviation(tz, &daylight_at),
        );
    }
    lines.push("END:VTIMEZONE".to_string());
    Ok(lines)
}

fn push_observance(
    lines: &mut Vec<String>,
    kind: &str,
    anchor: &str,
    (from, to): (UtcOffset, UtcOffset),
    name: &str,
) {
    lines.push(format!("BEGIN:{}", kind));
    lines.push(format!("DTSTART:{}", anchor));
    lines.push(format!("TZOFFSETFROM:{}", from));
    lines.push(format!("TZOFFSETTO:{}", to));
    lines.push(format!("TZNAME:{}", name));
    lines.push(format!("END:{}", kind));
}

/// The zone abbreviation (`PST`, `CEST`) in effect at a UTC instant.
fn abbreviation(tz: Tz, instant: &NaiveDateTime) -> String {
    tz.from_utc_datetime(instant).format("%Z").to_string()
}

/// Sets the `PRODID` and inserts the timezone ahead of the first component.
fn finish_document(raw: &str, prodid: &str, timezone: &[String]) -> String {
    let mut out = String::with_capacity(raw.len() + 256);
    let mut in_header = true;

    for line in raw.lines() {
        if in_header && line.starts_with("PRODID:") {
            out.push_str("PRODID:");
            out.push_str(prodid);
            out.push_str("\r\n");
            continue;
        }
        if in_header && line.starts_with("BEGIN:") && line != "BEGIN:VCALENDAR" {
            in_header = false;
            for tz_line in timezone {
                out.push_str(tz_line);
                out.push_str("\r\n");
            }
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}
