//! Error types for extraction and event assembly.
//!
//! Two levels of failure are kept apart:
//! - [`ExtractionError`]: the request as a whole failed (service down, payload
//!   unreadable, nothing to extract)
//! - [`ItemError`]: one extracted event was rejected while its siblings were
//!   assembled normally

use std::fmt;

use calendarize_core::DateParseError;
use thiserror::Error;

/// The category of an extraction error.
///
/// Hosts map these to response codes and use [`is_retryable`] to decide
/// whether a request may be sent again.
///
/// [`is_retryable`]: ExtractionErrorCode::is_retryable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionErrorCode {
    /// The extraction service could not be reached or failed.
    ServiceUnavailable,
    /// The extraction service refused the request for quota reasons.
    RateLimited,
    /// The service answered with something that is not an event payload.
    InvalidPayload,
    /// The request carried neither text nor an image.
    EmptyRequest,
    /// One or more extracted events were rejected.
    ItemsRejected,
    /// The extractor is missing settings it needs.
    Configuration,
    /// Unexpected state.
    Internal,
}

impl ExtractionErrorCode {
    /// Returns true if the same request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::RateLimited)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "service_unavailable",
            Self::RateLimited => "rate_limited",
            Self::InvalidPayload => "invalid_payload",
            Self::EmptyRequest => "empty_request",
            Self::ItemsRejected => "items_rejected",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ExtractionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request-level extraction failure.
#[derive(Debug, Error)]
pub struct ExtractionError {
    code: ExtractionErrorCode,
    message: String,
    /// Name of the extractor that failed, if known.
    extractor: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExtractionError {
    pub fn new(code: ExtractionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extractor: None,
            source: None,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::ServiceUnavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::RateLimited, message)
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::InvalidPayload, message)
    }

    pub fn empty_request(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::EmptyRequest, message)
    }

    pub fn items_rejected(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::ItemsRejected, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ExtractionErrorCode::Internal, message)
    }

    /// Sets the extractor name for this error.
    pub fn with_extractor(mut self, extractor: impl Into<String>) -> Self {
        self.extractor = Some(extractor.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ExtractionErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extractor(&self) -> Option<&str> {
        self.extractor.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref extractor) = self.extractor {
            write!(f, "[{}] ", extractor)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// An extracted entry failed validation.
#[derive(Debug, Error)]
pub enum ExtractionValidationError {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("invalid {field} {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The entry is not an object of the expected shape.
    #[error("malformed event entry: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why a single event could not be assembled.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Validation(#[from] ExtractionValidationError),

    #[error(transparent)]
    DateParse(#[from] DateParseError),
}

/// A rejected entry of an extraction batch.
#[derive(Debug, Error)]
#[error("event #{index}: {error}")]
pub struct ItemError {
    /// Position of the entry in the payload.
    pub index: usize,
    /// The entry's title, when one could be read.
    pub title: Option<String>,
    #[source]
    pub error: EventError,
}
