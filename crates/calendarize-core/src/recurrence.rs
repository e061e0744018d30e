//! Recurrence rules for calendar events.
//!
//! A [`Recurrence`] is rendered two ways:
//! - the query-string form `RRULE:FREQ=WEEKLY;BYDAY=MO,WE;COUNT=10` carried by
//!   the Google, Outlook and Yahoo deep links ([`rrule_string`])
//! - a structured RFC 5545 `RRULE` property for ICS documents ([`rrule_property`])
//!
//! Non-recurring events produce nothing in either form.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use chrono_tz::Tz;
use icalendar::Property;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventRecord;
use crate::time::{compact_utc, localize};

/// A recurrence value that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} {value:?}")]
pub struct RecurrenceParseError {
    /// What was being parsed (`recurrence pattern`, `weekday`).
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

/// How often an event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The RFC 5545 `FREQ` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(RecurrenceParseError {
                kind: "recurrence pattern",
                value: s.to_string(),
            }),
        }
    }
}

/// A day of the week, serialized as its two-letter RFC 5545 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl Weekday {
    /// The two-letter `BYDAY` code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Weekday {
    type Err = RecurrenceParseError;

    /// Accepts two-letter codes, three-letter abbreviations and English day
    /// names, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.as_str() {
            "mo" | "mon" | "monday" => Self::Monday,
            "tu" | "tue" | "tues" | "tuesday" => Self::Tuesday,
            "we" | "wed" | "wednesday" => Self::Wednesday,
            "th" | "thu" | "thur" | "thurs" | "thursday" => Self::Thursday,
            "fr" | "fri" | "friday" => Self::Friday,
            "sa" | "sat" | "saturday" => Self::Saturday,
            "su" | "sun" | "sunday" => Self::Sunday,
            _ => {
                return Err(RecurrenceParseError {
                    kind: "weekday",
                    value: s.to_string(),
                });
            }
        };
        Ok(day)
    }
}

/// The repeat rule of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// Repeat frequency.
    pub pattern: Frequency,
    /// Days of the week, in extraction order. Only used by weekly rules.
    pub days: Vec<Weekday>,
    /// Total number of occurrences.
    pub count: Option<u32>,
    /// Last date on which an occurrence may start.
    pub until: Option<NaiveDate>,
}

impl Recurrence {
    /// Creates an unbounded rule with the given frequency.
    pub fn new(pattern: Frequency) -> Self {
        Self {
            pattern,
            days: Vec::new(),
            count: None,
            until: None,
        }
    }

    /// Builder method to set the weekdays. Repeated days are dropped, the
    /// first occurrence keeps its position.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days.clear();
        for day in days {
            if !self.days.contains(&day) {
                self.days.push(day);
            }
        }
        self
    }

    /// Builder method to set the occurrence count. Zero means unbounded.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = (count > 0).then_some(count);
        self
    }

    /// Builder method to set the end date.
    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    /// The `BYDAY` value, present only for weekly rules with days.
    pub fn by_day(&self) -> Option<String> {
        if self.pattern != Frequency::Weekly || self.days.is_empty() {
            return None;
        }
        Some(
            self.days
                .iter()
                .map(Weekday::code)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// The rule in query-string form: `RRULE:FREQ=..[;BYDAY=..][;COUNT=..][;UNTIL=YYYYMMDD]`.
    pub fn to_rrule_string(&self) -> String {
        let until = self.until.map(|d| d.format("%Y%m%d").to_string());
        format!("RRULE:{}", self.rule_parts(until))
    }

    /// The rule as an ICS `RRULE` property.
    ///
    /// For timed events `UNTIL` is the last second of the end date in the
    /// event's zone, expressed in UTC; all-day events keep the bare date.
    pub fn to_property(&self, tz: Tz, is_all_day: bool) -> Property {
        let until = self.until.map(|date| {
            let last_second = date
                .and_hms_opt(23, 59, 59)
                .and_then(|naive| localize(naive, tz));
            match last_second {
                Some(local) if !is_all_day => compact_utc(&local),
                _ => date.format("%Y%m%d").to_string(),
            }
        });
        Property::new("RRULE", self.rule_parts(until))
    }

    fn rule_parts(&self, until: Option<String>) -> String {
        let mut rule = format!("FREQ={}", self.pattern);
        if let Some(days) = self.by_day() {
            rule.push_str(";BYDAY=");
            rule.push_str(&days);
        }
        if let Some(count) = self.count {
            rule.push_str(&format!(";COUNT={}", count));
        }
        if let Some(until) = until {
            rule.push_str(";UNTIL=");
            rule.push_str(&until);
        }
        rule
    }
}

/// The query-string rule of a record, `None` when it does not recur.
pub fn rrule_string(record: &EventRecord) -> Option<String> {
    record.recurrence().map(Recurrence::to_rrule_string)
}

/// The ICS `RRULE` property of a record, `None` when it does not recur.
pub fn rrule_property(record: &EventRecord) -> Option<Property> {
    record
        .recurrence()
        .map(|rule| rule.to_property(record.time_zone(), record.is_all_day()))
}
