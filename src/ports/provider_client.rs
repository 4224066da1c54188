//! Provider client port for upstream image-generation APIs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProviderFailure;
use crate::model::ProviderId;

/// Everything a provider needs for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    /// Roster name of the golfer.
    pub subject: String,
    /// Prompt text sent upstream.
    pub prompt: String,
    /// Edge length of the normalized square.
    pub edge: u32,
    /// Normalized square image as PNG. Shared between attempts, never mutated.
    #[serde(skip)]
    pub image_png: Arc<[u8]>,
}

/// An image returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

/// Boxed future type returned by [`ProviderClient::attempt`].
pub type AttemptFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedImage, ProviderFailure>> + Send + 'a>>;

/// A single upstream provider. One call is one HTTP attempt, no retries.
pub trait ProviderClient: Send + Sync {
    /// Which provider this client talks to.
    fn id(&self) -> ProviderId;

    /// Make one generation attempt.
    fn attempt(&self, request: &ProviderRequest) -> AttemptFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
