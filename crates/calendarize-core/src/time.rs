//! Temporal normalization for extracted events.
//!
//! This module turns the loosely formatted timestamp strings produced by the
//! extraction service into absolute, zone-aware datetimes:
//! - [`TemporalContext`]: the caller's "now" and local zone, threaded through
//!   unmodified so results are deterministic per request
//! - [`parse_datetime`] / [`parse_date`]: string to datetime/date resolution
//! - [`normalize_span`]: end-time defaults, zero-duration bump, midnight clamp
//! - formatting helpers shared by the renderers

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

/// Naive datetime layouts accepted from the extraction service, most common first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Hours forced onto events whose start and end are identical.
pub const ZERO_DURATION_BUMP_HOURS: i64 = 1;

/// A date or datetime string could not be resolved to an absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} {input:?}: {reason}")]
pub struct DateParseError {
    /// The field the value came from (e.g. `start_time`).
    pub field: &'static str,
    /// The offending input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl DateParseError {
    /// Creates a new error for an unnamed value.
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: "value",
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Attributes this error to a named field.
    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = field;
        self
    }
}

/// The caller-supplied temporal context of one request.
///
/// Relative expressions such as a bare `14:30` are resolved against `now`
/// as observed in the event's zone. The context is never recomputed inside
/// the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalContext {
    /// The caller's current instant.
    pub now: DateTime<Utc>,
    /// The caller's local zone, used when an event names none.
    pub time_zone: Tz,
}

impl TemporalContext {
    /// Creates a context from already-parsed values.
    pub fn new(now: DateTime<Utc>, time_zone: Tz) -> Self {
        Self { now, time_zone }
    }

    /// Parses the context as sent by a client: an ISO 8601 UTC instant
    /// (`2025-06-02T22:00:00Z`) and an IANA zone name.
    pub fn parse(local_time: &str, local_tz: &str) -> Result<Self, DateParseError> {
        let time_zone = parse_timezone(local_tz).map_err(|e| e.with_field("local_tz"))?;
        let trimmed = local_time.trim();
        let now = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map(|n| n.and_utc())
            })
            .map_err(|e| DateParseError::new(local_time, e.to_string()).with_field("local_time"))?;
        Ok(Self { now, time_zone })
    }

    /// Like [`TemporalContext::parse`], but falls back to `fallback` when the
    /// client sent no zone at all. A zone that was sent and is unknown is
    /// still an error.
    pub fn parse_with_fallback(
        local_time: &str,
        local_tz: Option<&str>,
        fallback: Tz,
    ) -> Result<Self, DateParseError> {
        match local_tz.map(str::trim).filter(|tz| !tz.is_empty()) {
            Some(tz) => Self::parse(local_time, tz),
            None => {
                debug!(fallback = %fallback.name(), "no client time zone, using fallback");
                Self::parse(local_time, fallback.name())
            }
        }
    }

    /// Returns the calendar date of `now` in the given zone.
    pub fn today_in(&self, tz: Tz) -> NaiveDate {
        self.now.with_timezone(&tz).date_naive()
    }
}

/// Resolves an IANA zone identifier.
pub fn parse_timezone(name: &str) -> Result<Tz, DateParseError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DateParseError::new(name, "unknown IANA time zone").with_field("time_zone"))
}

/// Resolves a timestamp string into an absolute datetime in `tz`.
///
/// Strings carrying an offset are converted into `tz`; naive strings are
/// interpreted as local time in `tz`; date-only strings resolve to local
/// midnight; time-only strings land on the context's current date.
pub fn parse_datetime(
    input: &str,
    tz: Tz,
    context: &TemporalContext,
) -> Result<DateTime<Tz>, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(input, "empty value"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return check_year(dt.with_timezone(&tz), input);
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z") {
        return check_year(dt.with_timezone(&tz), input);
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
                .map(|time| context.today_in(tz).and_time(time))
        })
        .ok_or_else(|| DateParseError::new(input, "unrecognized date/time format"))?;

    let naive = check_year(naive, input)?;
    localize(naive, tz)
        .ok_or_else(|| DateParseError::new(input, format!("no such local time in {}", tz.name())))
}

/// Resolves a date string (recurrence end dates). Datetime strings are
/// accepted and truncated to their date.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(input, "empty value"));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| DateParseError::new(input, "unrecognized date format"))
        .and_then(|date| check_year(date, input))
}

/// Rejects years the calendar formats cannot carry (four digits, CE).
fn check_year<T: Datelike>(value: T, input: &str) -> Result<T, DateParseError> {
    if SUPPORTED_YEARS.contains(&value.year()) {
        Ok(value)
    } else {
        Err(DateParseError::new(input, "year out of range"))
    }
}

/// Interprets a naive local datetime in `tz`.
///
/// Ambiguous times (DST fall-back) take the earliest instant. Times inside a
/// DST gap are read with the offset in effect before the gap, which moves
/// them forward by the gap's length.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }
    let before = tz
        .offset_from_local_datetime(&naive.checked_sub_signed(Duration::hours(3))?)
        .earliest()?
        .fix();
    let utc = naive.checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))?;
    Some(tz.from_utc_datetime(&utc))
}

/// Rules applied when completing an event's time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanPolicy {
    /// Length given to events without an end, or with an end before the start.
    pub default_duration: Duration,
    /// Pull an end of exactly 00:00 on the following day back to 23:59:59.
    pub clamp_midnight_end: bool,
}

impl Default for SpanPolicy {
    fn default() -> Self {
        Self {
            default_duration: Duration::hours(1),
            clamp_midnight_end: true,
        }
    }
}

/// Completes and repairs an event's time span.
///
/// The returned span always satisfies `end >= start`. Both values must
/// already be expressed in the event's zone: the midnight clamp is evaluated
/// on local wall-clock time, after zone conversion. Only a supplied end is
/// clamped; ends computed here are kept as they are.
pub fn normalize_span(
    start: DateTime<Tz>,
    end: Option<DateTime<Tz>>,
    is_all_day: bool,
    policy: &SpanPolicy,
) -> (DateTime<Tz>, DateTime<Tz>) {
    let (start, end) = if is_all_day {
        (start_of_day(start), end.map(start_of_day))
    } else {
        (start, end)
    };

    let end = match end {
        None => add_or_keep(start, policy.default_duration),
        Some(end) => {
            let end = if !is_all_day && policy.clamp_midnight_end {
                clamp_midnight_end(start, end)
            } else {
                end
            };
            if end == start {
                add_or_keep(start, Duration::hours(ZERO_DURATION_BUMP_HOURS))
            } else if end < start {
                warn!(
                    start = %start.to_rfc3339(),
                    end = %end.to_rfc3339(),
                    "event ends before it starts, applying default duration"
                );
                add_or_keep(start, policy.default_duration)
            } else {
                end
            }
        }
    };

    (start, end)
}

/// Adds `duration` to `start`, keeping `start` if the result is not
/// representable.
fn add_or_keep(start: DateTime<Tz>, duration: Duration) -> DateTime<Tz> {
    start.checked_add_signed(duration).unwrap_or_else(|| {
        warn!(start = %start.to_rfc3339(), "event end out of range, keeping start");
        start
    })
}

/// Clamps an end of exactly midnight after the start date to 23:59:59 of
/// the start date.
fn clamp_midnight_end(start: DateTime<Tz>, end: DateTime<Tz>) -> DateTime<Tz> {
    let start_date = start.date_naive();
    if end.time() != NaiveTime::MIN || start_date.succ_opt() != Some(end.date_naive()) {
        return end;
    }
    start_date
        .and_hms_opt(23, 59, 59)
        .and_then(|last_second| localize(last_second, start.timezone()))
        .unwrap_or(end)
}

/// Returns local midnight of the datetime's date.
fn start_of_day(dt: DateTime<Tz>) -> DateTime<Tz> {
    localize(dt.date_naive().and_time(NaiveTime::MIN), dt.timezone()).unwrap_or(dt)
}

/// Formats a local datetime as `YYYYMMDDTHHMMSS`.
pub fn compact_local(dt: &DateTime<Tz>) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// The 8-character `YYYYMMDD` truncation of [`compact_local`], used for
/// all-day events.
pub fn compact_date(dt: &DateTime<Tz>) -> String {
    let mut compact = compact_local(dt);
    compact.truncate(8);
    compact
}

/// Formats an instant as `YYYYMMDDTHHMMSSZ` in UTC.
pub fn compact_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SSZ` in UTC.
pub fn iso_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// A UTC offset rendered the way iCalendar expects it (`-0800`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcOffset(pub i32);

impl UtcOffset {
    /// The offset of `tz` at the given UTC instant.
    pub fn at(tz: Tz, instant: &NaiveDateTime) -> Self {
        Self(tz.offset_from_utc_datetime(instant).fix().local_minus_utc())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let minutes = self.0.abs() / 60;
        write!(f, "{}{:02}{:02}", sign, minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn la() -> Tz {
        "America/Los_Angeles".parse().unwrap()
    }

    fn context() -> TemporalContext {
        TemporalContext::parse("2025-06-02T22:00:00Z", "America/Los_Angeles").unwrap()
    }

    fn local(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod temporal_context {
        use super::*;

        #[test]
        fn parses_client_context() {
            let ctx = context();
            assert_eq!(ctx.time_zone, la());
            assert_eq!(ctx.now, Utc.with_ymd_and_hms(2025, 6, 2, 22, 0, 0).unwrap());
        }

        #[test]
        fn accepts_fractional_seconds() {
            let ctx = TemporalContext::parse("2025-06-02T22:00:00.000Z", "UTC").unwrap();
            assert_eq!(ctx.now.hour(), 22);
        }

        #[test]
        fn today_depends_on_zone() {
            // 2025-06-03T02:00Z is still June 2nd in Los Angeles
            let ctx = TemporalContext::parse("2025-06-03T02:00:00Z", "UTC").unwrap();
            assert_eq!(
                ctx.today_in(la()),
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
            );
            assert_eq!(
                ctx.today_in(Tz::UTC),
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
            );
        }

        #[test]
        fn rejects_unknown_zone() {
            let err = TemporalContext::parse("2025-06-02T22:00:00Z", "Mars/Olympus").unwrap_err();
            assert_eq!(err.field, "local_tz");
        }

        #[test]
        fn fallback_only_when_zone_missing() {
            let ctx =
                TemporalContext::parse_with_fallback("2025-06-02T22:00:00Z", None, la()).unwrap();
            assert_eq!(ctx.time_zone, la());
            let ctx =
                TemporalContext::parse_with_fallback("2025-06-02T22:00:00Z", Some("  "), la())
                    .unwrap();
            assert_eq!(ctx.time_zone, la());
            let ctx = TemporalContext::parse_with_fallback(
                "2025-06-02T22:00:00Z",
                Some("Europe/Paris"),
                la(),
            )
            .unwrap();
            assert_eq!(ctx.time_zone.name(), "Europe/Paris");
            assert!(
                TemporalContext::parse_with_fallback("2025-06-02T22:00:00Z", Some("Nowhere"), la())
                    .is_err()
            );
        }

        #[test]
        fn rejects_garbage_time() {
            let err = TemporalContext::parse("yesterday-ish", "UTC").unwrap_err();
            assert_eq!(err.field, "local_time");
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn naive_iso_is_local() {
            let dt = parse_datetime("2025-06-02T15:00:00", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-06-02T15:00:00-07:00");
        }

        #[test]
        fn compact_form_is_local() {
            let dt = parse_datetime("20250220T170000", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-02-20T17:00:00-08:00");
        }

        #[test]
        fn minute_precision_forms() {
            let a = parse_datetime("2025-06-02T15:00", la(), &context()).unwrap();
            let b = parse_datetime("2025-06-02 15:00", la(), &context()).unwrap();
            let c = parse_datetime("20250602T1500", la(), &context()).unwrap();
            assert_eq!(a, b);
            assert_eq!(b, c);
        }

        #[test]
        fn offset_is_converted_into_zone() {
            let dt = parse_datetime("2025-06-02T22:00:00Z", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-06-02T15:00:00-07:00");

            let dt = parse_datetime("2025-06-02T18:00:00-04:00", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-06-02T15:00:00-07:00");
        }

        #[test]
        fn date_only_is_local_midnight() {
            let dt = parse_datetime("2025-03-15", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-03-15T00:00:00-07:00");

            let dt = parse_datetime("20250130", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-01-30T00:00:00-08:00");
        }

        #[test]
        fn time_only_uses_context_date() {
            let dt = parse_datetime("14:30", la(), &context()).unwrap();
            assert_eq!(dt, local(la(), 2025, 6, 2, 14, 30, 0));
        }

        #[test]
        fn garbage_is_an_error() {
            let err = parse_datetime("next tuesday-ish", la(), &context()).unwrap_err();
            assert_eq!(err.input, "next tuesday-ish");
            assert!(parse_datetime("   ", la(), &context()).is_err());
        }

        #[test]
        fn dst_gap_moves_forward() {
            // 02:30 does not exist on 2025-03-09 in Los Angeles
            let dt = parse_datetime("2025-03-09T02:30:00", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-03-09T03:30:00-07:00");
        }

        #[test]
        fn dst_overlap_takes_earliest() {
            let dt = parse_datetime("2025-11-02T01:30:00", la(), &context()).unwrap();
            assert_eq!(dt.to_rfc3339(), "2025-11-02T01:30:00-07:00");
        }

        #[test]
        fn parse_date_forms() {
            let expected = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
            assert_eq!(parse_date("20250130").unwrap(), expected);
            assert_eq!(parse_date("2025-01-30").unwrap(), expected);
            assert_eq!(parse_date("2025-01-30T10:00:00").unwrap(), expected);
            assert_eq!(parse_date("2025-01-30T10:00:00Z").unwrap(), expected);
            assert!(parse_date("January-ish").is_err());
        }

        #[test]
        fn rejects_years_outside_calendar_range() {
            let err = parse_date("0000-06-01").unwrap_err();
            assert_eq!(err.reason, "year out of range");
            assert!(parse_date("+10000-01-01").is_err());

            let err = parse_datetime("0000-06-01T09:00:00", la(), &context()).unwrap_err();
            assert_eq!(err.reason, "year out of range");
            assert!(parse_datetime("9999-12-31T23:00:00", la(), &context()).is_ok());
        }

        #[test]
        fn timezone_lookup() {
            assert_eq!(parse_timezone(" America/Los_Angeles ").unwrap(), la());
            let err = parse_timezone("Pacific Time").unwrap_err();
            assert_eq!(err.field, "time_zone");
        }
    }

    mod spans {
        use super::*;

        #[test]
        fn equal_start_end_gets_one_hour() {
            let start = parse_datetime("2025-06-02T15:00:00", la(), &context()).unwrap();
            let (start, end) = normalize_span(start, Some(start), false, &SpanPolicy::default());
            assert_eq!(end - start, Duration::hours(1));
            assert_eq!(end.to_rfc3339(), "2025-06-02T16:00:00-07:00");
        }

        #[test]
        fn missing_end_uses_default_duration() {
            let start = local(la(), 2025, 6, 2, 9, 0, 0);
            let policy = SpanPolicy {
                default_duration: Duration::minutes(30),
                ..SpanPolicy::default()
            };
            let (_, end) = normalize_span(start, None, false, &policy);
            assert_eq!(end, local(la(), 2025, 6, 2, 9, 30, 0));
        }

        #[test]
        fn reversed_span_is_repaired() {
            let start = local(la(), 2025, 6, 2, 15, 0, 0);
            let end = local(la(), 2025, 6, 2, 14, 0, 0);
            let (start, end) = normalize_span(start, Some(end), false, &SpanPolicy::default());
            assert!(end >= start);
            assert_eq!(end - start, Duration::hours(1));
        }

        #[test]
        fn valid_span_is_untouched() {
            let start = local(la(), 2025, 6, 2, 14, 0, 0);
            let end = local(la(), 2025, 6, 2, 16, 0, 0);
            assert_eq!(
                normalize_span(start, Some(end), false, &SpanPolicy::default()),
                (start, end)
            );
        }

        #[test]
        fn midnight_end_is_clamped() {
            let start = local(la(), 2025, 6, 2, 20, 0, 0);
            let end = local(la(), 2025, 6, 3, 0, 0, 0);
            let (_, end) = normalize_span(start, Some(end), false, &SpanPolicy::default());
            assert_eq!(end, local(la(), 2025, 6, 2, 23, 59, 59));
        }

        #[test]
        fn clamp_applies_after_zone_conversion() {
            // 07:00Z on June 3rd is midnight in Los Angeles
            let start = parse_datetime("2025-06-02T20:00:00", la(), &context()).unwrap();
            let end = parse_datetime("2025-06-03T07:00:00Z", la(), &context()).unwrap();
            let (_, end) = normalize_span(start, Some(end), false, &SpanPolicy::default());
            assert_eq!(end.to_rfc3339(), "2025-06-02T23:59:59-07:00");
        }

        #[test]
        fn clamp_can_be_disabled() {
            let start = local(la(), 2025, 6, 2, 20, 0, 0);
            let end = local(la(), 2025, 6, 3, 0, 0, 0);
            let policy = SpanPolicy {
                clamp_midnight_end: false,
                ..SpanPolicy::default()
            };
            assert_eq!(normalize_span(start, Some(end), false, &policy).1, end);
        }

        #[test]
        fn multi_day_midnight_is_not_clamped() {
            let start = local(la(), 2025, 6, 2, 20, 0, 0);
            let end = local(la(), 2025, 6, 4, 0, 0, 0);
            let (_, got) = normalize_span(start, Some(end), false, &SpanPolicy::default());
            assert_eq!(got, end);
        }

        #[test]
        fn all_day_truncates_to_midnight() {
            let start = local(la(), 2025, 3, 15, 9, 0, 0);
            let end = local(la(), 2025, 3, 17, 18, 0, 0);
            let (start, end) = normalize_span(start, Some(end), true, &SpanPolicy::default());
            assert_eq!(start, local(la(), 2025, 3, 15, 0, 0, 0));
            assert_eq!(end, local(la(), 2025, 3, 17, 0, 0, 0));
        }

        #[test]
        fn late_equal_start_end_gets_full_hour() {
            let start = local(la(), 2025, 6, 2, 23, 0, 0);
            let (start, end) = normalize_span(start, Some(start), false, &SpanPolicy::default());
            assert_eq!(end - start, Duration::hours(1));
            assert_eq!(end.to_rfc3339(), "2025-06-03T00:00:00-07:00");
        }

        #[test]
        fn late_missing_end_gets_default_duration() {
            let start = local(la(), 2025, 6, 2, 23, 0, 0);
            let (start, end) = normalize_span(start, None, false, &SpanPolicy::default());
            assert_eq!(end - start, Duration::hours(1));
        }

        #[test]
        fn late_reversed_span_gets_default_duration() {
            let start = local(la(), 2025, 6, 2, 23, 0, 0);
            let end = local(la(), 2025, 6, 2, 22, 0, 0);
            let (start, end) = normalize_span(start, Some(end), false, &SpanPolicy::default());
            assert_eq!(end - start, Duration::hours(1));
        }

        #[test]
        fn unrepresentable_end_keeps_start() {
            let start = Tz::UTC.from_utc_datetime(&NaiveDateTime::MAX);
            let (_, end) = normalize_span(start, None, false, &SpanPolicy::default());
            assert_eq!(end, start);
            let (_, end) = normalize_span(start, Some(start), false, &SpanPolicy::default());
            assert_eq!(end, start);
        }

        #[test]
        fn never_negative() {
            let base = local(la(), 2025, 6, 2, 12, 0, 0);
            for offset in [-600, -60, -1, 0, 1, 60, 600, 1440] {
                for all_day in [false, true] {
                    let end = base + Duration::minutes(offset);
                    let (s, e) = normalize_span(base, Some(end), all_day, &SpanPolicy::default());
                    assert!(e >= s, "offset {offset} all_day {all_day}");
                }
            }
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn compact_forms() {
            let dt = local(la(), 2025, 6, 2, 15, 4, 5);
            assert_eq!(compact_local(&dt), "20250602T150405");
            assert_eq!(compact_date(&dt), "20250602");
            assert_eq!(compact_utc(&dt), "20250602T220405Z");
            assert_eq!(iso_utc(&dt), "2025-06-02T22:04:05Z");
        }

        #[test]
        fn offsets() {
            let winter = NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_time(NaiveTime::MIN);
            assert_eq!(UtcOffset::at(la(), &winter).to_string(), "-0800");
            let kolkata: Tz = "Asia/Kolkata".parse().unwrap();
            assert_eq!(UtcOffset::at(kolkata, &winter).to_string(), "+0530");
            assert_eq!(UtcOffset(0).to_string(), "+0000");
        }
    }
}
