//! Error types for the reference data reload
//!
//! Every variant belongs to one pipeline [`Stage`] so a failed run can say
//! where it stopped. None of these are recovered locally: the coordinator
//! rolls the transaction back and hands the error to the caller.

use crate::feed::FeedResource;
use thiserror::Error;

/// Result type alias for reload operations
pub type Result<T> = std::result::Result<T, RataError>;

/// Pipeline stage an error originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Transport,
    Decompression,
    Format,
    Persistence,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Configuration => write!(f, "configuration"),
            Stage::Transport => write!(f, "transport"),
            Stage::Decompression => write!(f, "decompression"),
            Stage::Format => write!(f, "format"),
            Stage::Persistence => write!(f, "persistence"),
        }
    }
}

/// Main error type for the reload pipeline
#[derive(Error, Debug)]
pub enum RataError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, TLS, timeout or body read failure
    #[error("Request for {resource} failed: {source}")]
    Transport {
        resource: FeedResource,
        #[source]
        source: reqwest::Error,
    },

    #[error("Feed returned HTTP {status} for {resource}. Check the feed credentials and subscription.")]
    HttpStatus {
        resource: FeedResource,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decompress {resource} payload: {source}")]
    Decompression {
        resource: FeedResource,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {resource} payload: {message}")]
    Format {
        resource: FeedResource,
        message: String,
    },

    #[error("{resource} payload has no top-level '{key}' entry list")]
    MissingKey {
        resource: FeedResource,
        key: &'static str,
    },

    #[error("{resource} entry {index} is missing field '{field}'")]
    MissingField {
        resource: FeedResource,
        index: usize,
        field: &'static str,
    },

    #[error("{resource} entry {index} has invalid field '{field}': {message}")]
    InvalidField {
        resource: FeedResource,
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("Database error while {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl RataError {
    /// Stage of the pipeline this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            RataError::Config(_) => Stage::Configuration,
            RataError::Transport { .. } | RataError::HttpStatus { .. } => Stage::Transport,
            RataError::Decompression { .. } => Stage::Decompression,
            RataError::Format { .. }
            | RataError::MissingKey { .. }
            | RataError::MissingField { .. }
            | RataError::InvalidField { .. } => Stage::Format,
            RataError::Persistence { .. } => Stage::Persistence,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn format(resource: FeedResource, message: impl Into<String>) -> Self {
        Self::Format {
            resource,
            message: message.into(),
        }
    }

    /// Wrap a sqlx error with the operation that was running
    pub(crate) fn persistence(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Persistence { operation, source }
    }
}
