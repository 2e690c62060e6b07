//! Error types for the Kafka backup explorer.
//!
//! This crate provides:
//! - [`KbxError`] - Top-level error enum for explorer operations
//! - Domain-specific errors ([`StorageError`], [`ContentError`])
//! - [`KbxError::is_invalid_request`] so callers can tell a rejected request
//!   apart from an empty result or a server failure

use thiserror::Error;

/// Top-level error type for the explorer.
#[derive(Error, Debug)]
pub enum KbxError {
    /// Configuration errors (missing bucket, bad pattern, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller supplied parameters that can never produce a result
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Storage listing or read errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Decompression or decoding of a data file failed
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KbxError {
    /// Whether this error was caused by the request parameters.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, KbxError::InvalidRequest(_))
    }

    /// Short machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            KbxError::Config(_) => "config_error",
            KbxError::InvalidRequest(_) => "invalid_request",
            KbxError::Storage(_) => "storage_error",
            KbxError::Content(_) => "content_error",
            KbxError::Other(_) => "internal_error",
        }
    }
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to reach the storage backend
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Listing one directory level failed
    #[error("Listing '{prefix}' failed: {message}")]
    List { prefix: String, message: String },

    /// Reading one object failed
    #[error("Fetching '{key}' failed: {message}")]
    Fetch { key: String, message: String },
}

/// Content decoding errors.
#[derive(Error, Debug)]
pub enum ContentError {
    /// Gzip decompression failed
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Decompressed bytes are not valid text
    #[error("Decoding failed: {0}")]
    Decoding(String),
}

/// Result type alias using KbxError.
pub type Result<T> = std::result::Result<T, KbxError>;
