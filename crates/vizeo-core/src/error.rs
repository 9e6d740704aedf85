//! Error types for Vizeo Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Malformed command payload: {0}")]
    MalformedCommand(#[from] serde_json::Error),

    #[error("Inbound message carries no text payload")]
    MissingPayload,

    // Playback errors
    #[error("Playback request rejected: {0}")]
    PlaybackRejected(String),

    #[error("Property not allowed: {0}")]
    PropertyNotAllowed(String),

    #[error("Failed to write property {name}: {reason}")]
    PropertyWrite { name: String, reason: String },

    // Channel errors
    #[error("Unable to deliver message: {0}")]
    Delivery(String),

    #[error("Listener registration failed: {0}")]
    Listener(String),

    // Streaming errors
    #[error("Streaming error ({kind}): {details}")]
    Streaming {
        kind: String,
        details: String,
        fatal: bool,
    },

    #[error("HLS is not supported in this environment")]
    UnsupportedEnvironment,

    // Configuration errors
    #[error("Missing mandatory `src` parameter")]
    MissingSource,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a streaming error
    pub fn streaming(kind: impl Into<String>, details: impl Into<String>, fatal: bool) -> Self {
        Error::Streaming {
            kind: kind.into(),
            details: details.into(),
            fatal,
        }
    }

    /// Returns the error code used in structured logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MalformedCommand(_) => "MALFORMED_COMMAND",
            Error::MissingPayload => "MISSING_PAYLOAD",
            Error::PlaybackRejected(_) => "PLAYBACK_REJECTED",
            Error::PropertyNotAllowed(_) => "PROPERTY_NOT_ALLOWED",
            Error::PropertyWrite { .. } => "PROPERTY_WRITE",
            Error::Delivery(_) => "DELIVERY",
            Error::Listener(_) => "LISTENER",
            Error::Streaming { .. } => "STREAMING",
            Error::UnsupportedEnvironment => "UNSUPPORTED_ENVIRONMENT",
            Error::MissingSource => "MISSING_SOURCE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Internal(_) => "INTERNAL",
        }
    }
}
