// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the attune companion.

use strum::{Display, EnumString};
use thiserror::Error;

/// The primary error type used across all attune adapter traits and core operations.
#[derive(Debug, Error)]
pub enum AttuneError {
    /// Bad input shape or range. Always rejected before any external call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing credential or invalid setup. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// The text-generation service reported a failure, or did not answer in time.
    #[error("service error: {message}")]
    Service {
        message: String,
        /// Upstream HTTP status, when the service answered at all.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service answered with a well-formed response carrying no usable text.
    #[error("service returned an empty response")]
    EmptyResponse,

    /// The service answered with a body that does not match the expected shape.
    #[error("malformed service response: {message}")]
    MalformedResponse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Emotion push channel errors (connect failure, closed socket).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A submission is already in flight for this session.
    #[error("a submission is already in progress for this session")]
    Busy,

    /// The hosting surface went away while a submission was in flight.
    #[error("submission cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`AttuneError`], used in logs and HTTP bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    Service,
    EmptyResponse,
    MalformedResponse,
    Storage,
    Channel,
    Busy,
    Cancelled,
    Internal,
}

impl AttuneError {
    /// Shorthand for a service error without an upstream status or source.
    pub fn service(message: impl Into<String>) -> Self {
        AttuneError::Service {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttuneError::Validation(_) => ErrorKind::Validation,
            AttuneError::Config(_) => ErrorKind::Configuration,
            AttuneError::Service { .. } => ErrorKind::Service,
            AttuneError::EmptyResponse => ErrorKind::EmptyResponse,
            AttuneError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            AttuneError::Storage { .. } => ErrorKind::Storage,
            AttuneError::Channel { .. } => ErrorKind::Channel,
            AttuneError::Busy => ErrorKind::Busy,
            AttuneError::Cancelled => ErrorKind::Cancelled,
            AttuneError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code the hosting layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Busy => 409,
            ErrorKind::Service | ErrorKind::MalformedResponse | ErrorKind::Channel => 503,
            ErrorKind::Configuration
            | ErrorKind::EmptyResponse
            | ErrorKind::Storage
            | ErrorKind::Cancelled
            | ErrorKind::Internal => 500,
        }
    }

    /// Whether a human or caller may reasonably try the same submission again.
    ///
    /// Nothing in this workspace retries automatically.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Service | ErrorKind::MalformedResponse | ErrorKind::EmptyResponse
        )
    }
}

/// A best-effort persistence failure. Logged and surfaced, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    /// The store operation that failed (e.g. `save_turns`).
    pub operation: &'static str,
    /// Rendered error message.
    pub message: String,
}

impl PersistenceWarning {
    pub fn new(operation: &'static str, err: &AttuneError) -> Self {
        Self {
            operation,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}
