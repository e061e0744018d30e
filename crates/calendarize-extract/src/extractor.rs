//! The extraction service seam.
//!
//! This module defines the [`EventExtractor`] trait, the boundary between
//! this crate and whatever turns free text (or a picture of a flyer) into an
//! [`ExtractionPayload`]. In production that is a language model behind an
//! HTTP API; tests use [`StaticExtractor`] and [`ErrorExtractor`].
//!
//! [`extract_events`] runs the whole pipeline: extraction, then assembly.

use std::future::Future;
use std::pin::Pin;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use calendarize_core::{CoreConfig, TemporalContext};
use tracing::debug;

use crate::assemble::{BatchOutcome, assemble_batch};
use crate::error::{ExtractionError, ExtractionResult};
use crate::raw_fields::ExtractionPayload;

/// A boxed future for async trait methods.
///
/// Boxing keeps [`EventExtractor`] object-safe so hosts can hold a
/// `Box<dyn EventExtractor>` chosen at runtime.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An image attached to an extraction request, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    data: String,
    mime_type: String,
}

impl ImageInput {
    /// Encodes raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Wraps data that is already base64-encoded, checking that it decodes.
    pub fn from_base64(data: impl Into<String>, mime_type: impl Into<String>) -> ExtractionResult<Self> {
        let data = data.into();
        STANDARD.decode(data.as_bytes()).map_err(|e| {
            ExtractionError::invalid_payload("image is not valid base64").with_source(e)
        })?;
        Ok(Self {
            data,
            mime_type: mime_type.into(),
        })
    }

    pub fn base64(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The image as a `data:` URL, the form vision APIs accept inline.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// What to extract events from.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Free text. May be empty when an image is attached.
    pub text: String,
    pub image: Option<ImageInput>,
    /// The caller's "now" and zone, handed to the extractor for relative
    /// dates and to the assembler afterwards.
    pub context: TemporalContext,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>, context: TemporalContext) -> Self {
        Self {
            text: text.into(),
            image: None,
            context,
        }
    }

    /// Builder method to attach an image.
    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    /// Returns true if there is nothing to extract from.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none()
    }
}

/// Turns an [`ExtractionRequest`] into a raw payload.
///
/// Implementations should be `Send + Sync` and must not retry internally;
/// retry policy belongs to the host, which can consult
/// [`ExtractionError::is_retryable`].
///
/// # Example Implementation
///
/// ```ignore
/// struct ModelExtractor {
///     client: reqwest::Client,
///     api_key: String,
/// }
///
/// impl EventExtractor for ModelExtractor {
///     fn name(&self) -> &str { "model" }
///
///     fn extract(&self, request: ExtractionRequest) -> BoxFuture<'_, ExtractionResult<ExtractionPayload>> {
///         Box::pin(async move {
///             let body = self.call_api(&request).await?;
///             ExtractionPayload::from_json(&body)
///         })
///     }
/// }
/// ```
pub trait EventExtractor: Send + Sync {
    /// Returns the name of this extractor, used in errors and logs.
    fn name(&self) -> &str;

    /// Extracts raw event entries from the request.
    fn extract(
        &self,
        request: ExtractionRequest,
    ) -> BoxFuture<'_, ExtractionResult<ExtractionPayload>>;
}

/// An extractor that answers every request with the same JSON document.
#[derive(Debug, Clone)]
pub struct StaticExtractor {
    name: String,
    response: String,
}

impl StaticExtractor {
    pub fn new(name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: response.into(),
        }
    }
}

impl EventExtractor for StaticExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(
        &self,
        _request: ExtractionRequest,
    ) -> BoxFuture<'_, ExtractionResult<ExtractionPayload>> {
        let result = ExtractionPayload::from_json(&self.response)
            .map_err(|e| e.with_extractor(&self.name));
        Box::pin(async move { result })
    }
}

/// An extractor that always fails.
///
/// Stands in for a service that could not be configured, and for failure
/// paths in tests.
#[derive(Debug)]
pub struct ErrorExtractor {
    name: String,
    error: ExtractionError,
}

impl ErrorExtractor {
    pub fn new(name: impl Into<String>, error: ExtractionError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl EventExtractor for ErrorExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(
        &self,
        _request: ExtractionRequest,
    ) -> BoxFuture<'_, ExtractionResult<ExtractionPayload>> {
        let error =
            ExtractionError::new(self.error.code(), self.error.message()).with_extractor(&self.name);
        Box::pin(async move { Err(error) })
    }
}

/// Extracts and assembles the events of one request.
///
/// # Errors
///
/// Fails with `EmptyRequest` before calling the extractor when the request
/// has neither text nor an image, and passes extractor failures through.
/// Rejected entries are not errors here; they are listed in the outcome.
pub async fn extract_events(
    extractor: &dyn EventExtractor,
    request: ExtractionRequest,
    config: &CoreConfig,
) -> ExtractionResult<BatchOutcome> {
    if request.is_empty() {
        return Err(
            ExtractionError::empty_request("request has neither text nor an image")
                .with_extractor(extractor.name()),
        );
    }

    let context = request.context;
    debug!(
        extractor = extractor.name(),
        text_len = request.text.len(),
        has_image = request.image.is_some(),
        "requesting extraction"
    );
    let payload = extractor.extract(request).await?;
    debug!(entries = payload.len(), "extraction returned");

    Ok(assemble_batch(&payload, &context, config))
}
