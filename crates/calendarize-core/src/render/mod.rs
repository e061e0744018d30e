//! Calendar link and document renderers.
//!
//! Each [`Renderer`] turns an [`EventRecord`] into one external
//! representation:
//! - [`Renderer::Google`]: Google Calendar "add event" deep link
//! - [`Renderer::Outlook`]: Outlook.com compose deep link
//! - [`Renderer::Yahoo`]: Yahoo Calendar deep link
//! - [`Renderer::Ics`]: a complete RFC 5545 document
//!
//! Rendering is pure. Given the same record and [`RenderOptions`] the output
//! is byte-identical.
//!
//! Google and Yahoo encode free text as `application/x-www-form-urlencoded`
//! (space becomes `+`). Outlook only understands percent-encoding (space
//! becomes `%20`).

pub mod google;
pub mod ics;
pub mod outlook;
pub mod yahoo;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventRecord;

pub use google::{google_api_event, google_link};
pub use ics::ics_document;
pub use outlook::outlook_link;
pub use yahoo::yahoo_link;

/// `PRODID` written into ICS documents unless configured otherwise.
pub const DEFAULT_PRODID: &str = "-//Calendarize//calendarize.tech//EN";

/// A derived value fell outside the range chrono can represent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("{field} is outside the representable date range")]
    DateOutOfRange { field: &'static str },
}

/// Inputs to rendering that do not come from the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Written as the ICS `DTSTAMP`.
    pub generated_at: DateTime<Utc>,
    /// Written as the ICS `PRODID`.
    pub prodid: String,
}

impl RenderOptions {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            prodid: DEFAULT_PRODID.to_string(),
        }
    }

    /// Builder method to set the `PRODID`.
    pub fn with_prodid(mut self, prodid: impl Into<String>) -> Self {
        self.prodid = prodid.into();
        self
    }
}

/// The supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renderer {
    Google,
    Outlook,
    Yahoo,
    Ics,
}

impl Renderer {
    /// Every renderer, in the order outputs are listed on a record.
    pub const ALL: [Renderer; 4] = [Self::Google, Self::Outlook, Self::Yahoo, Self::Ics];

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Outlook => "outlook",
            Self::Yahoo => "yahoo",
            Self::Ics => "ics",
        }
    }

    /// Renders `record` in this format.
    pub fn render(
        &self,
        record: &EventRecord,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        match self {
            Self::Google => Ok(google_link(record)),
            Self::Outlook => Ok(outlook_link(record)),
            Self::Yahoo => Ok(yahoo_link(record)),
            Self::Ics => ics_document(record, options),
        }
    }
}

/// How query values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryEncoding {
    /// `application/x-www-form-urlencoded`.
    Form,
    /// RFC 3986 percent-encoding.
    Percent,
}

impl QueryEncoding {
    pub(crate) fn encode(self, value: &str) -> String {
        match self {
            Self::Form => url::form_urlencoded::byte_serialize(value.as_bytes()).collect(),
            Self::Percent => urlencoding::encode(value).into_owned(),
        }
    }
}

/// Appends `&key=value` pairs to a fixed base URL.
#[derive(Debug)]
pub(crate) struct DeepLink {
    url: String,
    encoding: QueryEncoding,
}

impl DeepLink {
    /// Starts a link. `base` must already contain a `?`.
    pub(crate) fn new(base: &str, encoding: QueryEncoding) -> Self {
        Self {
            url: base.to_string(),
            encoding,
        }
    }

    /// Appends an encoded parameter.
    pub(crate) fn param(mut self, key: &str, value: &str) -> Self {
        let encoded = self.encoding.encode(value);
        self.push(key, &encoded);
        self
    }

    /// Appends an encoded parameter when a value is present.
    pub(crate) fn param_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Appends a parameter whose value is already URL-safe.
    pub(crate) fn raw(mut self, key: &str, value: &str) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a comma-separated list, encoding each item.
    pub(crate) fn list(mut self, key: &str, items: &[String]) -> Self {
        if items.is_empty() {
            return self;
        }
        let joined = items
            .iter()
            .map(|item| self.encoding.encode(item))
            .collect::<Vec<_>>()
            .join(",");
        self.push(key, &joined);
        self
    }

    fn push(&mut self, key: &str, value: &str) {
        self.url.push('&');
        self.url.push_str(key);
        self.url.push('=');
        self.url.push_str(value);
    }

    pub(crate) fn finish(self) -> String {
        self.url
    }
}

/// The day after the last day of an all-day event, as ICS and the Google
/// API expect.
pub(crate) fn exclusive_end_date(record: &EventRecord) -> Result<NaiveDate, RenderError> {
    record
        .end_time()
        .date_naive()
        .succ_opt()
        .ok_or(RenderError::DateOutOfRange { field: "end_time" })
}
