//! Error types for photogen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FailureReason;

/// Errors that stop a generation request before or outside the provider chain.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// The `image` field was missing or empty.
    #[error("image is required")]
    ImageRequired,

    /// The requested subject is not on the roster.
    #[error("'{0}' is not on the roster")]
    InvalidSubject(String),

    /// The upload exceeds the configured ceiling.
    #[error("upload exceeds limit of {limit} bytes")]
    TooLarge {
        /// Configured ceiling in bytes.
        limit: usize,
    },

    /// The request body could not be read as the expected form.
    #[error("malformed request: {0}")]
    BadRequest(String),

    /// The upload could not be decoded as an image.
    #[error(transparent)]
    Decode(#[from] CodecError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that should surface as a 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PhotoError {
    /// Stable error code returned to HTTP clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImageRequired => "image_required",
            Self::InvalidSubject(_) => "invalid_golfer",
            Self::TooLarge { .. } => "image_too_large",
            Self::BadRequest(_) => "bad_request",
            Self::Decode(CodecError::Decode(_)) => "invalid_image",
            Self::Decode(CodecError::Encode(_))
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => {
                "internal"
            }
        }
    }
}

/// Image decode/encode failures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// An in-memory encode failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// A classified failure from a single provider attempt.
///
/// Serializable so that recorded cassettes keep the classification.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderFailure {
    /// The provider answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
    },

    /// The outbound request could not be assembled.
    #[error("failed to build request: {message}")]
    Request {
        /// What went wrong.
        message: String,
    },

    /// The attempt exceeded the per-call timeout.
    #[error("timed out after {seconds}s")]
    TimedOut {
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// A 2xx response without a usable image payload.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// What was wrong with the body.
        message: String,
    },
}

impl ProviderFailure {
    /// Map the failure onto the reason reported with a fallback result.
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Rejected { .. }
            | Self::Transport { .. }
            | Self::Request { .. }
            | Self::TimedOut { .. } => FailureReason::UpstreamRejected,
            Self::InvalidResponse { .. } => FailureReason::InvalidUpstreamResponse,
        }
    }
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport { message: e.to_string() }
    }
}
