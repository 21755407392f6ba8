//! Typed error variants for the tab-tally-config crate.
//!
//! Callers that only need a message can bubble these through `anyhow`;
//! callers that care about the failure mode can match on the variants.

use thiserror::Error;

/// Errors that can occur while loading, saving or editing preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the preferences file.
    #[error("I/O error accessing preferences: {0}")]
    Io(#[from] std::io::Error),

    /// The preferences file contained YAML that could not be parsed.
    #[error("YAML parse error in preferences: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A key passed to [`crate::PreferenceStore::set`] is not a known preference.
    #[error("Unknown preference key '{0}'")]
    UnknownKey(String),

    /// A value could not be converted to the type of its preference.
    #[error("Invalid value for preference '{key}': {source}")]
    InvalidValue {
        /// Preference key that was being set.
        key: String,
        /// Underlying conversion error.
        #[source]
        source: serde_json::Error,
    },

    /// A value parsed but failed semantic validation.
    ///
    /// The inner string names the field and the rule it broke.
    #[error("Preference validation error: {0}")]
    Validation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
