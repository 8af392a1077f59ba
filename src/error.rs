use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VwsError {
    #[error("Element not found: {locator} (waited {waited:?})")]
    ElementNotFound { locator: String, waited: Duration },

    #[error("Timeout after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Element {locator} rejected interaction: {reason}")]
    Interaction { locator: String, reason: String },

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Browser launch error: {0}")]
    Launch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl VwsError {
    /// Element missing at lookup time, with no wait involved.
    pub fn not_found(locator: impl ToString) -> Self {
        VwsError::ElementNotFound {
            locator: locator.to_string(),
            waited: Duration::ZERO,
        }
    }

    pub fn interaction(locator: impl ToString, reason: impl Into<String>) -> Self {
        VwsError::Interaction {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors a polling wait treats as "not yet" rather than fatal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VwsError::ElementNotFound { .. } | VwsError::Interaction { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VwsError>;
