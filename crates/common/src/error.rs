//! Common error types for statusprobe components.

use std::fmt;

/// A specialized Result type for statusprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for statusprobe operations.
///
/// Library crates keep their own precise error enums; this type is what the
/// process boundary sees once those have been flattened.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new initialization error.
    pub fn init(msg: impl fmt::Display) -> Self {
        Error::Init(msg.to_string())
    }

    /// Create a new publish error.
    pub fn publish(msg: impl fmt::Display) -> Self {
        Error::Publish(msg.to_string())
    }
}
