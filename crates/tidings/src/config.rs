//! Emitter configuration.
//!
//! ```toml
//! label = "editor"
//! dead_events = true
//! meta_events = true
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmitterError, EmitterResult};

/// Behaviour switches for an [`EventEmitter`](crate::EventEmitter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Name attached to every log line the emitter writes.
    pub label: Option<String>,
    /// Synthesize a `DeadEvent` when a named event has no listeners.
    pub dead_events: bool,
    /// Synthesize `AddListenerEvent` and `RemoveListenerEvent`, the latter
    /// also for `once` listeners consumed by dispatch.
    pub meta_events: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            label: None,
            dead_events: true,
            meta_events: true,
        }
    }
}

impl EmitterConfig {
    /// Default configuration with a label.
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enable or disable `DeadEvent` synthesis.
    #[must_use]
    pub fn with_dead_events(mut self, enabled: bool) -> Self {
        self.dead_events = enabled;
        self
    }

    /// Enable or disable listener meta-events.
    #[must_use]
    pub fn with_meta_events(mut self, enabled: bool) -> Self {
        self.meta_events = enabled;
        self
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::ConfigParse`] for malformed TOML and
    /// [`EmitterError::InvalidConfig`] if validation fails.
    pub fn from_toml_str(source: &str) -> EmitterResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|source| EmitterError::ConfigParse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::ConfigIo`] if the file cannot be read, and
    /// the errors of [`EmitterConfig::from_toml_str`] otherwise.
    pub fn load(path: &Path) -> EmitterResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| EmitterError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), label = ?config.label, "loaded emitter config");
        Ok(config)
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns [`EmitterError::InvalidConfig`] if the label is blank.
    pub fn validate(&self) -> EmitterResult<()> {
        if let Some(label) = &self.label
            && label.trim().is_empty()
        {
            return Err(EmitterError::InvalidConfig {
                field: "label".to_owned(),
                message: "label must not be blank; omit it instead".to_owned(),
            });
        }
        Ok(())
    }

    /// Label used in log fields.
    pub(crate) fn log_label(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}
