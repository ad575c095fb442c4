//! Error types for the reconciler
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed schema validation; no external call was made
    #[error("validation error: {0}")]
    Validation(String),

    /// The target already exists where the request wants to create it
    #[error("{0}")]
    Conflict(String),

    /// SES API errors
    #[error("SES error: {0}")]
    Ses(String),

    /// Route53 API errors
    #[error("Route53 error: {0}")]
    Route53(String),

    /// STS / credential errors
    #[error("STS error: {0}")]
    Sts(String),

    /// A physical resource id that does not parse
    #[error("malformed physical resource id: {0}")]
    PhysicalId(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an SES error
    pub fn ses(msg: impl Into<String>) -> Self {
        Self::Ses(msg.into())
    }

    /// Create a Route53 error
    pub fn route53(msg: impl Into<String>) -> Self {
        Self::Route53(msg.into())
    }

    /// Create an STS error
    pub fn sts(msg: impl Into<String>) -> Self {
        Self::Sts(msg.into())
    }

    /// Create a malformed physical id error
    pub fn physical_id(msg: impl Into<String>) -> Self {
        Self::PhysicalId(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
