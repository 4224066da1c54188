//! Live adapter for the Stability AI image-to-image API (strength transform).

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{decode_image_payload, excerpt, read_success_body};
use crate::error::ProviderFailure;
use crate::model::ProviderId;
use crate::params::DEFAULT_STRENGTH;
use crate::ports::provider_client::{AttemptFuture, ProviderClient, ProviderRequest};
use crate::ports::GeneratedImage;

/// Default image-to-image endpoint.
pub const STABILITY_IMAGE_TO_IMAGE_URL: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-xl-1024-v1-0/image-to-image";

const CFG_SCALE: u32 = 7;
const STEPS: u32 = 30;

/// Multipart body for a strength-based transform: init image, prompt and strength.
#[derive(Debug, Clone)]
pub struct StrengthTransformRequest {
    /// Prompt text.
    pub prompt: String,
    /// How far the output may drift from the init image, in `[0, 1]`.
    pub strength: f32,
    /// Normalized square PNG.
    pub image_png: Arc<[u8]>,
}

impl StrengthTransformRequest {
    /// Build the multipart form.
    ///
    /// # Errors
    ///
    /// Returns an error if a part cannot be constructed.
    pub fn into_form(self) -> Result<Form, ProviderFailure> {
        let init =
            Part::bytes(self.image_png.to_vec()).file_name("init.png").mime_str("image/png")?;
        Ok(Form::new()
            .part("init_image", init)
            .text("init_image_mode", "IMAGE_STRENGTH")
            .text("image_strength", format!("{:.2}", self.strength))
            .text("text_prompts[0][text]", self.prompt)
            .text("text_prompts[0][weight]", "1")
            .text("cfg_scale", CFG_SCALE.to_string())
            .text("samples", "1")
            .text("steps", STEPS.to_string()))
    }
}

/// Strength-transform client for the Stability AI REST API.
pub struct StabilityClient {
    client: Client,
    api_key: String,
    endpoint: String,
    strength: f32,
}

impl StabilityClient {
    /// Create a new client with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: STABILITY_IMAGE_TO_IMAGE_URL.to_string(),
            strength: DEFAULT_STRENGTH,
        }
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the image strength.
    #[must_use]
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Assemble the request body for `request`.
    #[must_use]
    pub fn build_request(&self, request: &ProviderRequest) -> StrengthTransformRequest {
        StrengthTransformRequest {
            prompt: request.prompt.clone(),
            strength: self.strength,
            image_png: Arc::clone(&request.image_png),
        }
    }
}

impl ProviderClient for StabilityClient {
    fn id(&self) -> ProviderId {
        ProviderId::Stability
    }

    fn attempt(&self, request: &ProviderRequest) -> AttemptFuture<'_> {
        let body = self.build_request(request);
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Accept", "application/json")
                .multipart(body.into_form()?)
                .send()
                .await?;

            let response_text = read_success_body(response).await?;
            parse_response(&response_text)
        })
    }
}

fn parse_response(body: &str) -> Result<GeneratedImage, ProviderFailure> {
    let parsed: StabilityResponse = serde_json::from_str(body).map_err(|e| {
        ProviderFailure::InvalidResponse { message: format!("Failed to parse response: {e}") }
    })?;
    let artifact = parsed
        .artifacts
        .into_iter()
        .find(|a| a.base64.is_some() && a.finish_reason.as_deref() != Some("ERROR"))
        .and_then(|a| a.base64)
        .ok_or_else(|| ProviderFailure::InvalidResponse {
            message: format!("No artifacts in response. Body: {}", excerpt(body)),
        })?;
    decode_image_payload(&artifact)
}

// --- Stability API response types ---

#[derive(Deserialize)]
struct StabilityResponse {
    #[serde(default)]
    artifacts: Vec<StabilityArtifact>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StabilityArtifact {
    base64: Option<String>,
    finish_reason: Option<String>,
}
