#![forbid(unsafe_code)]

//! List configuration.
//!
//! ```toml
//! deferred_completion = true
//! viewport_height = 800.0
//!
//! [reconciler]
//! animate_differences = true
//! ```

use slist_runtime::{ConfigError, ReconcilerConfig};

/// Configuration for a [`SimpleList`](crate::SimpleList).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ListConfig {
    /// Reconciler behavior.
    pub reconciler: ReconcilerConfig,

    /// Hold animated batches until
    /// [`finish_animation`](crate::ListHost::finish_animation) instead of
    /// completing them synchronously.
    ///
    /// Default: false
    pub deferred_completion: bool,

    /// Height of the visible band, used for visible-row queries.
    ///
    /// Default: 640.0
    pub viewport_height: f32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerConfig::default(),
            deferred_completion: false,
            viewport_height: Self::DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl ListConfig {
    const DEFAULT_VIEWPORT_HEIGHT: f32 = 640.0;

    /// Copy with unusable values replaced by defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if !(config.viewport_height.is_finite() && config.viewport_height > 0.0) {
            config.viewport_height = Self::DEFAULT_VIEWPORT_HEIGHT;
        }
        config
    }

    /// Reject values [`sanitized`](Self::sanitized) would replace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "viewport_height",
                reason: format!("must be a positive finite number, got {}", self.viewport_height),
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] on unusable values.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
