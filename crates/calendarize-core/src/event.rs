//! The normalized event record.
//!
//! This module provides:
//! - [`EventRecord`]: one extracted event with an absolute, zone-aware span
//! - [`RenderedOutputs`]: storage for the links and documents derived from it
//!
//! A record is built once, by the assembler or directly by a caller. Apart
//! from the derived outputs it does not change afterwards.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use tracing::debug;
use uuid::Uuid;

use crate::recurrence::{Frequency, Recurrence, Weekday};
use crate::render::{RenderError, RenderOptions, Renderer};
use crate::time::{SpanPolicy, normalize_span};

/// Outputs derived from a record, each filled at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedOutputs {
    pub gcal_link: Option<String>,
    pub outlook_link: Option<String>,
    pub yahoo_link: Option<String>,
    pub ics: Option<String>,
}

impl RenderedOutputs {
    /// The stored output of a renderer.
    pub fn get(&self, renderer: Renderer) -> Option<&str> {
        match renderer {
            Renderer::Google => self.gcal_link.as_deref(),
            Renderer::Outlook => self.outlook_link.as_deref(),
            Renderer::Yahoo => self.yahoo_link.as_deref(),
            Renderer::Ics => self.ics.as_deref(),
        }
    }

    fn slot_mut(&mut self, renderer: Renderer) -> &mut Option<String> {
        match renderer {
            Renderer::Google => &mut self.gcal_link,
            Renderer::Outlook => &mut self.outlook_link,
            Renderer::Yahoo => &mut self.yahoo_link,
            Renderer::Ics => &mut self.ics,
        }
    }
}

/// A normalized calendar event.
///
/// The span always satisfies `end_time >= start_time`, and both ends are
/// expressed in the record's zone. Construct through [`EventRecord::new`],
/// [`EventRecord::all_day`] or [`EventRecord::from_span`], which run the
/// span through [`normalize_span`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    uid: String,
    title: String,
    is_all_day: bool,
    start_time: DateTime<Tz>,
    end_time: DateTime<Tz>,
    description: Option<String>,
    location: Option<String>,
    attendees: Vec<String>,
    recurrence: Option<Recurrence>,
    rendered: RenderedOutputs,
}

impl EventRecord {
    /// Title given to records constructed with a blank title.
    pub const DEFAULT_TITLE: &'static str = "No Title";

    /// Creates a timed event using the default span policy.
    pub fn new(title: impl Into<String>, start: DateTime<Tz>, end: Option<DateTime<Tz>>) -> Self {
        Self::from_span(title, start, end, false, &SpanPolicy::default())
    }

    /// Creates an all-day event using the default span policy.
    pub fn all_day(
        title: impl Into<String>,
        start: DateTime<Tz>,
        end: Option<DateTime<Tz>>,
    ) -> Self {
        Self::from_span(title, start, end, true, &SpanPolicy::default())
    }

    /// Creates an event, normalizing the span under `policy`.
    ///
    /// The record's zone is the zone of `start`; `end` is converted into it
    /// before normalization.
    pub fn from_span(
        title: impl Into<String>,
        start: DateTime<Tz>,
        end: Option<DateTime<Tz>>,
        is_all_day: bool,
        policy: &SpanPolicy,
    ) -> Self {
        let tz = start.timezone();
        let end = end.map(|e| e.with_timezone(&tz));
        let (start_time, end_time) = normalize_span(start, end, is_all_day, policy);

        let title = title.into();
        let title = if title.trim().is_empty() {
            Self::DEFAULT_TITLE.to_string()
        } else {
            title.trim().to_string()
        };

        Self {
            uid: Uuid::new_v4().to_string(),
            title,
            is_all_day,
            start_time,
            end_time,
            description: None,
            location: None,
            attendees: Vec::new(),
            recurrence: None,
            rendered: RenderedOutputs::default(),
        }
    }

    /// Builder method to set the description. Blank text clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    /// Builder method to set the location. Blank text clears it.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    /// Builder method to add one attendee address.
    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        if let Some(email) = non_blank(email.into()) {
            self.attendees.push(email);
        }
        self
    }

    /// Builder method to set the attendee addresses, keeping their order.
    pub fn with_attendees<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = emails
            .into_iter()
            .filter_map(|e| non_blank(e.into()))
            .collect();
        self
    }

    /// Builder method to make the event recurring.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Builder method to replace the generated UID.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_all_day(&self) -> bool {
        self.is_all_day
    }

    pub fn start_time(&self) -> DateTime<Tz> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Tz> {
        self.end_time
    }

    pub fn time_zone(&self) -> Tz {
        self.start_time.timezone()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Returns the length of the event.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Outputs rendered so far.
    pub fn rendered_outputs(&self) -> &RenderedOutputs {
        &self.rendered
    }

    /// The stored output of `renderer`, if it has run.
    pub fn rendered(&self, renderer: Renderer) -> Option<&str> {
        self.rendered.get(renderer)
    }

    /// Renders the record with `renderer` and stores the output.
    ///
    /// The first call computes and stores the output; later calls return the
    /// stored value without rendering again.
    pub fn render(
        &mut self,
        renderer: Renderer,
        options: &RenderOptions,
    ) -> Result<&str, RenderError> {
        if self.rendered.get(renderer).is_none() {
            let output = renderer.render(self, options)?;
            debug!(
                renderer = renderer.name(),
                uid = %self.uid,
                bytes = output.len(),
                "rendered event"
            );
            *self.rendered.slot_mut(renderer) = Some(output);
        }
        Ok(self.rendered.get(renderer).unwrap_or_default())
    }

    /// Renders all four outputs.
    pub fn render_all(&mut self, options: &RenderOptions) -> Result<(), RenderError> {
        for renderer in Renderer::ALL {
            self.render(renderer, options)?;
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Serialize)]
struct EventRecordJson<'a> {
    uid: &'a str,
    title: &'a str,
    is_all_day: bool,
    start_time: String,
    end_time: String,
    time_zone: &'static str,
    description: Option<&'a str>,
    location: Option<&'a str>,
    attendees: &'a [String],
    is_recurring: bool,
    recurrence_pattern: Option<Frequency>,
    recurrence_days: Option<&'a [Weekday]>,
    recurrence_count: Option<u32>,
    recurrence_end_date: Option<String>,
    gcal_link: Option<&'a str>,
    outlook_link: Option<&'a str>,
    yahoo_link: Option<&'a str>,
    ics: Option<&'a str>,
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rule = self.recurrence.as_ref();
        EventRecordJson {
            uid: &self.uid,
            title: &self.title,
            is_all_day: self.is_all_day,
            start_time: self.start_time.to_rfc3339(),
            end_time: self.end_time.to_rfc3339(),
            time_zone: self.time_zone().name(),
            description: self.description.as_deref(),
            location: self.location.as_deref(),
            attendees: &self.attendees,
            is_recurring: rule.is_some(),
            recurrence_pattern: rule.map(|r| r.pattern),
            recurrence_days: rule.map(|r| r.days.as_slice()),
            recurrence_count: rule.and_then(|r| r.count),
            recurrence_end_date: rule
                .and_then(|r| r.until)
                .map(|d| d.format("%Y-%m-%d").to_string()),
            gcal_link: self.rendered.gcal_link.as_deref(),
            outlook_link: self.rendered.outlook_link.as_deref(),
            yahoo_link: self.rendered.yahoo_link.as_deref(),
            ics: self.rendered.ics.as_deref(),
        }
        .serialize(serializer)
    }
}
