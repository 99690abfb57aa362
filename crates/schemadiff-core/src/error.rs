//! Error taxonomy for filtering and fingerprinting

/// Errors raised by the diff and fingerprint core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An ignore pattern could not be compiled
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The canonical representation could not be serialized
    #[error("failed to serialize canonical schema: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for the core
pub type Result<T> = std::result::Result<T, Error>;
