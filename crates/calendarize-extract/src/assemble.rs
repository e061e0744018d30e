//! Extracted fields to [`EventRecord`] assembly.
//!
//! The assembly of one entry:
//! 1. Decode the raw dictionary into [`RawExtractedFields`]
//! 2. Validate required fields and the recurrence vocabulary
//! 3. Resolve times in the event's zone (or the caller's) against the
//!    request's [`TemporalContext`]
//! 4. Normalize the span and attach optional fields
//!
//! A batch keeps going past rejected entries and reports each one with its
//! position.

use calendarize_core::{
    CoreConfig, EventRecord, Recurrence, RenderError, RenderOptions, TemporalContext, parse_date,
    parse_datetime, parse_timezone,
};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{EventError, ExtractionError, ExtractionResult, ItemError};
use crate::raw_fields::{ExtractedFields, ExtractionPayload, RawExtractedFields, RecurrenceFields};

/// Builds an [`EventRecord`] from validated fields.
///
/// The event's own zone wins over the caller's. The context is passed
/// through to the normalizer unchanged.
pub fn assemble_event(
    fields: &ExtractedFields,
    context: &TemporalContext,
    config: &CoreConfig,
) -> Result<EventRecord, EventError> {
    let tz: Tz = match fields.time_zone.as_deref() {
        Some(name) => parse_timezone(name)?,
        None => context.time_zone,
    };

    let start = parse_datetime(&fields.start_time, tz, context)
        .map_err(|e| e.with_field("start_time"))?;
    let end = fields
        .end_time
        .as_deref()
        .map(|end| parse_datetime(end, tz, context).map_err(|e| e.with_field("end_time")))
        .transpose()?;

    let mut record = EventRecord::from_span(
        fields.title.as_str(),
        start,
        end,
        fields.is_all_day,
        &config.span_policy(),
    )
    .with_attendees(fields.attendees.iter().cloned());

    if let Some(description) = &fields.description {
        record = record.with_description(description.as_str());
    }
    if let Some(location) = &fields.location {
        record = record.with_location(location.as_str());
    }
    if let Some(rule) = &fields.recurrence {
        record = record.with_recurrence(build_recurrence(rule)?);
    }

    debug!(
        title = record.title(),
        start = %record.start_time().to_rfc3339(),
        end = %record.end_time().to_rfc3339(),
        recurring = record.is_recurring(),
        "assembled event"
    );
    Ok(record)
}

fn build_recurrence(fields: &RecurrenceFields) -> Result<Recurrence, EventError> {
    let mut rule = Recurrence::new(fields.pattern).with_days(fields.days.iter().copied());
    if let Some(count) = fields.count {
        rule = rule.with_count(count);
    }
    if let Some(end_date) = &fields.end_date {
        let until = parse_date(end_date).map_err(|e| e.with_field("recurrence_end_date"))?;
        rule = rule.with_until(until);
    }
    Ok(rule)
}

/// Decodes, validates and assembles one payload entry.
pub fn assemble_entry(
    value: &Value,
    context: &TemporalContext,
    config: &CoreConfig,
) -> Result<EventRecord, EventError> {
    let fields = RawExtractedFields::from_value(value)?.validate()?;
    assemble_event(&fields, context, config)
}

/// The records and rejections of one extraction batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Assembled records, in payload order.
    pub events: Vec<EventRecord>,
    /// Rejected entries, in payload order.
    pub errors: Vec<ItemError>,
}

impl BatchOutcome {
    /// Returns true if no entry was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Renders every output of every record.
    pub fn render_all(&mut self, options: &RenderOptions) -> Result<(), RenderError> {
        for record in &mut self.events {
            record.render_all(options)?;
        }
        Ok(())
    }

    /// Fails the whole batch if any entry was rejected.
    ///
    /// The first rejection becomes the error's source.
    pub fn into_strict(self) -> ExtractionResult<Vec<EventRecord>> {
        let total = self.events.len() + self.errors.len();
        let rejected = self.errors.len();
        match self.errors.into_iter().next() {
            None => Ok(self.events),
            Some(first) => Err(ExtractionError::items_rejected(format!(
                "{} of {} extracted events rejected",
                rejected, total
            ))
            .with_source(first)),
        }
    }
}

/// Assembles every entry of a payload.
pub fn assemble_batch(
    payload: &ExtractionPayload,
    context: &TemporalContext,
    config: &CoreConfig,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, value) in payload.events.iter().enumerate() {
        match assemble_entry(value, context, config) {
            Ok(record) => outcome.events.push(record),
            Err(error) => {
                let title = value
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                warn!(index, title = ?title, error = %error, "rejected extracted event");
                outcome.errors.push(ItemError {
                    index,
                    title,
                    error,
                });
            }
        }
    }

    info!(
        accepted = outcome.events.len(),
        rejected = outcome.errors.len(),
        "assembled extraction batch"
    );
    outcome
}
