//! From extraction payloads to calendar events.
//!
//! This crate sits between an extraction service and the event model in
//! `calendarize-core`:
//!
//! - [`EventExtractor`] - The seam a text or vision extraction service implements
//! - [`ExtractionPayload`] - The raw `{"events": [...]}` answer of that service
//! - [`assemble_batch`] - Validates and normalizes each entry into an [`EventRecord`]
//! - [`ExtractionError`] - Request-level failures; [`ItemError`] for single entries
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  ExtractionRequest   │  text, optional image, TemporalContext
//! └──────────┬───────────┘
//!            │
//!            ▼ EventExtractor::extract()
//! ┌──────────────────────┐
//! │  ExtractionPayload   │
//! └──────────┬───────────┘
//!            │
//!            ▼ assemble_batch()
//! ┌──────────────────────┐    ┌──────────────┐
//! │     EventRecord      │    │  ItemError   │
//! └──────────┬───────────┘    └──────────────┘
//!            │
//!            ▼ render_all()
//! ┌──────────────────────┐
//! │ Google, Outlook,     │
//! │ Yahoo links and ICS  │
//! └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calendarize_core::{CoreConfig, RenderOptions, TemporalContext};
//! use calendarize_extract::{EventExtractor, ExtractionRequest, extract_events};
//!
//! async fn calendarize(extractor: &dyn EventExtractor, text: &str) -> anyhow::Result<()> {
//!     let config = CoreConfig::default();
//!     let context = TemporalContext::parse("2025-06-02T10:00:00-07:00", "America/Los_Angeles")?;
//!     let mut outcome = extract_events(extractor, ExtractionRequest::new(text, context), &config).await?;
//!     outcome.render_all(&RenderOptions::new(chrono::Utc::now()))?;
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod error;
pub mod extractor;
pub mod raw_fields;

// Re-export main types at crate root
pub use assemble::{BatchOutcome, assemble_batch, assemble_entry, assemble_event};
pub use calendarize_core::EventRecord;
pub use error::{
    EventError, ExtractionError, ExtractionErrorCode, ExtractionResult, ExtractionValidationError,
    ItemError,
};
pub use extractor::{
    BoxFuture, ErrorExtractor, EventExtractor, ExtractionRequest, ImageInput, StaticExtractor,
    extract_events,
};
pub use raw_fields::{ExtractedFields, ExtractionPayload, RawExtractedFields, RecurrenceFields};
