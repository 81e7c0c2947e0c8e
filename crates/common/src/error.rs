//! Common error types for keepalived-notify components.

use std::fmt;

/// A specialized Result type for cloud and local I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type shared by the cloud client and the hook.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("API error (status {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new API error from a provider error response.
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error for the named resource.
    pub fn not_found(what: impl fmt::Display) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new transport error.
    pub fn transport(msg: impl fmt::Display) -> Self {
        Error::Transport(msg.to_string())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }

    /// Whether the error means the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }
}
