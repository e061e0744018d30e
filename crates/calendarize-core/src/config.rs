//! Core configuration.
//!
//! Settings are read from TOML. Every field has a default, so an empty
//! document is a valid configuration:
//!
//! ```toml
//! default_time_zone = "America/Los_Angeles"
//! default_duration_minutes = 60
//! clamp_midnight_end = true
//!
//! [ics]
//! prodid = "-//Calendarize//calendarize.tech//EN"
//! ```
//!
//! The core never looks for a configuration file on its own; hosts pass the
//! path to [`CoreConfig::load_from`] or build the struct directly.

use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::DEFAULT_PRODID;
use crate::time::{SpanPolicy, parse_timezone};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// CoreConfig
// ---------------------------------------------------------------------------

/// Configuration shared by the assembler and the renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Zone used when a client sends no zone at all.
    pub default_time_zone: String,

    /// Length of events extracted without an end time.
    pub default_duration_minutes: i64,

    /// Pull an end of exactly midnight back to 23:59:59 of the start date.
    pub clamp_midnight_end: bool,

    /// ICS document settings.
    pub ics: IcsSettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_time_zone: "America/Los_Angeles".to_string(),
            default_duration_minutes: 60,
            clamp_midnight_end: true,
            ics: IcsSettings::default(),
        }
    }
}

/// ICS document settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsSettings {
    /// Value of the calendar's `PRODID` property.
    pub prodid: String,
}

impl Default for IcsSettings {
    fn default() -> Self {
        Self {
            prodid: DEFAULT_PRODID.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_tz()?;
        if self.default_duration_minutes <= 0 {
            return Err(ConfigError::Invalid {
                field: "default_duration_minutes",
                reason: format!("must be positive, got {}", self.default_duration_minutes),
            });
        }
        if self.ics.prodid.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "ics.prodid",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The fallback zone.
    pub fn default_tz(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.default_time_zone).map_err(|e| ConfigError::Invalid {
            field: "default_time_zone",
            reason: e.to_string(),
        })
    }

    /// The span rules derived from this configuration.
    pub fn span_policy(&self) -> SpanPolicy {
        SpanPolicy {
            default_duration: Duration::minutes(self.default_duration_minutes.max(1)),
            clamp_midnight_end: self.clamp_midnight_end,
        }
    }
}
