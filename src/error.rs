//! Error types for leasekv
//!
//! Provides a unified error type for store, script, and network operations.
//! The lock manager and rate limiter never surface these to their callers;
//! they log them and return a negative result instead.

use thiserror::Error;

/// Result type alias using LeaseError
pub type Result<T> = std::result::Result<T, LeaseError>;

/// Unified error type for leasekv operations
#[derive(Debug, Error)]
pub enum LeaseError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Value at key '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("Store error: {0}")]
    Store(String),

    // -------------------------------------------------------------------------
    // Script Errors
    // -------------------------------------------------------------------------
    #[error("Unknown script: {0}")]
    UnknownScript(String),

    #[error("Script error: {0}")]
    Script(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for LeaseError {
    fn from(err: bincode::Error) -> Self {
        LeaseError::Serialization(err.to_string())
    }
}
