//! Error types for the arena combat core.

use thiserror::Error;

/// Top-level error type for arena operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// An enemy category name did not match any known category
    #[error("Unknown enemy category: {0:?}")]
    UnknownCategory(String),

    /// Configuration value out of its accepted domain
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type alias for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;
