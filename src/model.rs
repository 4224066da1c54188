//! Core request/result types and provider identities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::ports::GeneratedImage;

/// Upstream image-generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// `OpenAI` image edits (masked).
    OpenAi,
    /// Stability AI image-to-image (strength based).
    Stability,
}

impl ProviderId {
    /// Every known provider, in default priority order.
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::Stability];

    /// Identifier used in responses, logs and cassettes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Stability => "stability",
        }
    }

    /// Environment variable holding the provider credential.
    #[must_use]
    pub fn key_env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Stability => "STABILITY_API_KEY",
        }
    }

    /// Environment variable that force-disables the provider.
    #[must_use]
    pub fn bypass_env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "BYPASS_OPENAI",
            Self::Stability => "BYPASS_STABILITY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved, read-only settings for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
    /// Which provider.
    pub id: ProviderId,
    /// A credential is present.
    pub enabled: bool,
    /// Lower values are tried first.
    pub priority: u32,
    /// Skip this provider even when enabled.
    pub bypass: bool,
}

/// Why a request ended on the local composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No provider has a credential.
    MissingCredentials,
    /// At least one attempt got a non-2xx, transport error or timeout.
    UpstreamRejected,
    /// Every attempt returned 2xx without an image.
    InvalidUpstreamResponse,
    /// Every configured provider was bypassed.
    AllBypassed,
}

impl FailureReason {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::UpstreamRejected => "upstream_rejected",
            Self::InvalidUpstreamResponse => "invalid_upstream_response",
            Self::AllBypassed => "all_bypassed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Raw uploaded image bytes.
    pub image_bytes: Vec<u8>,
    /// Roster name of the celebrity.
    pub subject_name: String,
}

/// The single outcome produced for each request.
#[derive(Debug, Clone)]
pub enum GenerationResult {
    /// A provider produced the image.
    Success {
        /// Image returned by the provider.
        image: GeneratedImage,
        /// Provider that produced it.
        provider: ProviderId,
    },
    /// The local composite was used.
    Fallback {
        /// PNG bytes of the composite card.
        image: Vec<u8>,
        /// Why no provider result was used.
        reason: FailureReason,
    },
}

impl GenerationResult {
    /// Provider attribution: the provider id, or `"fallback"`.
    #[must_use]
    pub fn provider_label(&self) -> &'static str {
        match self {
            Self::Success { provider, .. } => provider.as_str(),
            Self::Fallback { .. } => "fallback",
        }
    }

    /// Fallback reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Fallback { reason, .. } => Some(*reason),
        }
    }

    /// Encoded image bytes.
    #[must_use]
    pub fn image_bytes(&self) -> &[u8] {
        match self {
            Self::Success { image, .. } => &image.data,
            Self::Fallback { image, .. } => image,
        }
    }

    /// Render the image as a `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        match self {
            Self::Success { image, .. } => codec::data_url(&image.mime_type, &image.data),
            Self::Fallback { image, .. } => codec::data_url("image/png", image),
        }
    }
}
