//! Field dictionaries as returned by the extraction service.
//!
//! The service answers with `{"events": [ {...}, ... ]}`. Every field of an
//! entry may be absent or `null`. Entries are decoded one at a time so a
//! single malformed entry does not sink the whole batch.

use calendarize_core::{Frequency, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExtractionError, ExtractionResult, ExtractionValidationError};

/// The top-level extraction response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPayload {
    /// Raw entries, decoded individually by [`RawExtractedFields::from_value`].
    #[serde(default)]
    pub events: Vec<Value>,
}

impl ExtractionPayload {
    /// Parses a service response.
    ///
    /// Fails only when the document itself is unreadable or lacks the
    /// `events` array shape; problems inside entries surface later as item
    /// errors.
    pub fn from_json(content: &str) -> ExtractionResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            ExtractionError::invalid_payload("response is not an event payload").with_source(e)
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// One extracted entry, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtractedFields {
    pub title: Option<String>,
    pub is_all_day: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub time_zone: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    pub recurrence_days: Option<Vec<String>>,
    /// Accepts `10`, `10.0` and `"10"`.
    #[serde(deserialize_with = "lenient_count")]
    pub recurrence_count: Option<i64>,
    pub recurrence_end_date: Option<String>,
}

/// Recurrence fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceFields {
    pub pattern: Frequency,
    pub days: Vec<Weekday>,
    pub count: Option<u32>,
    /// Unparsed; resolved by the temporal normalizer at assembly.
    pub end_date: Option<String>,
}

/// An entry that passed validation. Times are still strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub is_all_day: bool,
    pub start_time: String,
    pub end_time: Option<String>,
    pub time_zone: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub recurrence: Option<RecurrenceFields>,
}

impl RawExtractedFields {
    /// Decodes one payload entry.
    pub fn from_value(value: &Value) -> Result<Self, ExtractionValidationError> {
        Ok(Self::deserialize(value)?)
    }

    /// Checks required fields and parses the recurrence vocabulary.
    ///
    /// Optional text that is blank is treated as absent. Recurrence fields
    /// are only looked at when `is_recurring` is set and a pattern is given.
    pub fn validate(&self) -> Result<ExtractedFields, ExtractionValidationError> {
        let title =
            non_blank(self.title.as_deref()).ok_or(ExtractionValidationError::MissingField("title"))?;
        let start_time = non_blank(self.start_time.as_deref())
            .ok_or(ExtractionValidationError::MissingField("start_time"))?;

        let attendees = self
            .attendees
            .iter()
            .flatten()
            .filter_map(|email| non_blank(Some(email.as_str())))
            .collect();

        Ok(ExtractedFields {
            title,
            is_all_day: self.is_all_day.unwrap_or(false),
            start_time,
            end_time: non_blank(self.end_time.as_deref()),
            time_zone: non_blank(self.time_zone.as_deref()),
            description: non_blank(self.description.as_deref()),
            location: non_blank(self.location.as_deref()),
            attendees,
            recurrence: self.validate_recurrence()?,
        })
    }

    fn validate_recurrence(&self) -> Result<Option<RecurrenceFields>, ExtractionValidationError> {
        if !self.is_recurring.unwrap_or(false) {
            return Ok(None);
        }
        let Some(raw_pattern) = non_blank(self.recurrence_pattern.as_deref()) else {
            return Ok(None);
        };

        let pattern = raw_pattern
            .parse::<Frequency>()
            .map_err(|e| invalid("recurrence_pattern", &raw_pattern, e.to_string()))?;

        let days = self
            .recurrence_days
            .iter()
            .flatten()
            .filter_map(|day| non_blank(Some(day.as_str())))
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|e| invalid("recurrence_days", &day, e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = match self.recurrence_count {
            None | Some(0) => None,
            Some(n) if n < 0 => {
                return Err(invalid(
                    "recurrence_count",
                    &n.to_string(),
                    "must not be negative",
                ));
            }
            Some(n) => Some(u32::try_from(n).map_err(|_| {
                invalid("recurrence_count", &n.to_string(), "too large")
            })?),
        };

        Ok(Some(RecurrenceFields {
            pattern,
            days,
            count,
            end_date: non_blank(self.recurrence_end_date.as_deref()),
        }))
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct LenientCount;

    impl<'de> de::Visitor<'de> for LenientCount {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a whole number, a numeric string, or null")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Option<i64>, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Option<i64>, E> {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("count {value} is too large")))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Option<i64>, E> {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Ok(Some(value as i64))
            } else {
                Err(E::custom(format!("count {value} is not a whole number")))
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Option<i64>, E> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Ok(count) = trimmed.parse::<i64>() {
                return Ok(Some(count));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| E::custom(format!("count {value:?} is not a number")))
                .and_then(|count| self.visit_f64(count))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Option<i64>, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Option<i64>, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientCount)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> ExtractionValidationError {
    ExtractionValidationError::InvalidField {
        field,
        value: value.to_string(),
        reason: reason.into(),
    }
}
