//! Core types: temporal normalization, event records, recurrence, renderers

pub mod config;
pub mod event;
pub mod recurrence;
pub mod render;
pub mod time;
pub mod tracing;

pub use config::{ConfigError, CoreConfig, IcsSettings};
pub use event::{EventRecord, RenderedOutputs};
pub use recurrence::{
    Frequency, Recurrence, RecurrenceParseError, Weekday, rrule_property, rrule_string,
};
pub use render::{
    DEFAULT_PRODID, RenderError, RenderOptions, Renderer, google_api_event, google_link,
    ics_document, outlook_link, yahoo_link,
};
pub use time::{
    DateParseError, SpanPolicy, TemporalContext, normalize_span, parse_date, parse_datetime,
    parse_timezone,
};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
