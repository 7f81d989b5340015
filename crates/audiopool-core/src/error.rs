//! Error types for audiopool.

use thiserror::Error;

/// Result type alias using audiopool's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for audiopool.
#[derive(Error, Debug)]
pub enum Error {
    // Construction errors
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Audio host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Failed to create audio context: {0}")]
    ContextCreation(String),

    // Pool errors
    #[error("No effect channel available (pool {pool_len}, in flight {in_flight})")]
    PoolExhausted { pool_len: usize, in_flight: usize },

    // Configuration file errors
    #[error("Config error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error happened while building the manager.
    ///
    /// These are contract violations by the embedding application and should
    /// not be retried.
    pub const fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::HostUnavailable(_) | Self::ContextCreation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        assert!(Error::InvalidConfig("max 1".into()).is_construction());
        assert!(Error::ContextCreation("no slots".into()).is_construction());
        assert!(!Error::PoolExhausted {
            pool_len: 0,
            in_flight: 0
        }
        .is_construction());
    }

    #[test]
    fn test_error_display() {
        let err = Error::PoolExhausted {
            pool_len: 4,
            in_flight: 0,
        };
        assert_eq!(
            err.to_string(),
            "No effect channel available (pool 4, in flight 0)"
        );
    }
}
