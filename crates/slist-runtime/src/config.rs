#![forbid(unsafe_code)]

//! Reconciler configuration.
//!
//! Configuration is plain data with sensible defaults. With the `config`
//! feature it can also be loaded from TOML:
//!
//! ```toml
//! animate_differences = false
//! recover_from_observed_state = true
//! ```
//!
//! Unknown keys are rejected so that typos surface instead of silently
//! falling back to defaults.

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document could not be parsed or did not match the schema.
    #[cfg(feature = "config")]
    #[error("invalid list configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is not usable.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Configuration for a [`Reconciler`](crate::Reconciler).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ReconcilerConfig {
    /// Ask hosts to animate batches.
    ///
    /// Default: true
    pub animate_differences: bool,

    /// After a failed batch, adopt the host's observed items as the
    /// last-applied snapshot when the host can report them. Otherwise the
    /// attempted snapshot is assumed.
    ///
    /// Default: true
    pub recover_from_observed_state: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            animate_differences: true,
            recover_from_observed_state: true,
        }
    }
}

impl ReconcilerConfig {
    /// Parse from a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}
