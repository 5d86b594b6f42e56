//! Error types for cmdsplice
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SpliceError
pub type Result<T> = std::result::Result<T, SpliceError>;

/// Unified error type for cmdsplice operations
#[derive(Debug, Error)]
pub enum SpliceError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Format Errors
    // -------------------------------------------------------------------------
    /// Malformed byte stream. Fatal for the packet being decoded.
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Tree Cache Errors
    // -------------------------------------------------------------------------
    /// No merge output is published for this protocol version yet.
    #[error("Command tree for protocol {protocol} is not built yet")]
    RegistryUnavailable { protocol: i32 },

    // -------------------------------------------------------------------------
    // External Command Engine Errors
    // -------------------------------------------------------------------------
    #[error("Command execution failed: {0}")]
    Execution(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SpliceError {
    /// Shorthand for building a `Format` error
    pub fn format(message: impl Into<String>) -> Self {
        SpliceError::Format(message.into())
    }

    /// Whether this error comes from a malformed byte stream
    pub fn is_format(&self) -> bool {
        matches!(self, SpliceError::Format(_))
    }
}

impl From<serde_json::Error> for SpliceError {
    fn from(err: serde_json::Error) -> Self {
        SpliceError::Serialization(err.to_string())
    }
}
