//! Live adapter for the `OpenAI` image edits API (masked edit).

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{decode_image_payload, read_success_body};
use crate::codec::{self, EditableRegion, MaskEncoding};
use crate::error::ProviderFailure;
use crate::model::ProviderId;
use crate::params::EDITABLE_FRACTION;
use crate::ports::provider_client::{AttemptFuture, ProviderClient, ProviderRequest};

/// Default edits endpoint.
pub const OPENAI_EDITS_URL: &str = "https://api.openai.com/v1/images/edits";
/// Default edit model.
pub const OPENAI_EDIT_MODEL: &str = "gpt-image-1";

/// Multipart body for a masked edit: image, mask and prompt.
#[derive(Debug, Clone)]
pub struct MaskedEditRequest {
    /// Model identifier.
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Output size, e.g. `"1024x1024"`.
    pub size: String,
    /// Normalized square PNG.
    pub image_png: Arc<[u8]>,
    /// Same-size PNG mask.
    pub mask_png: Vec<u8>,
}

impl MaskedEditRequest {
    /// Build the multipart form.
    ///
    /// # Errors
    ///
    /// Returns an error if a part cannot be constructed.
    pub fn into_form(self) -> Result<Form, ProviderFailure> {
        let image =
            Part::bytes(self.image_png.to_vec()).file_name("image.png").mime_str("image/png")?;
        let mask = Part::bytes(self.mask_png).file_name("mask.png").mime_str("image/png")?;
        Ok(Form::new()
            .text("model", self.model)
            .text("prompt", self.prompt)
            .text("n", "1")
            .text("size", self.size)
            .part("image", image)
            .part("mask", mask))
    }
}

/// Masked-edit client for the `OpenAI` Images API.
pub struct OpenAiEditClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    mask_encoding: MaskEncoding,
}

impl OpenAiEditClient {
    /// Create a new client with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: OPENAI_EDITS_URL.to_string(),
            model: OPENAI_EDIT_MODEL.to_string(),
            mask_encoding: MaskEncoding::BlackEditable,
        }
    }

    /// Override the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the mask color convention.
    #[must_use]
    pub fn with_mask_encoding(mut self, encoding: MaskEncoding) -> Self {
        self.mask_encoding = encoding;
        self
    }

    /// Assemble the request body for `request`. A fresh mask is drawn each time.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderFailure::Request`] if the mask cannot be encoded.
    pub fn build_request(
        &self,
        request: &ProviderRequest,
    ) -> Result<MaskedEditRequest, ProviderFailure> {
        let edge = request.edge;
        let region = EditableRegion::right_fraction(edge, edge, EDITABLE_FRACTION);
        let mask_png = codec::build_edit_mask(edge, edge, region, self.mask_encoding)
            .map_err(|e| ProviderFailure::Request { message: e.to_string() })?;
        Ok(MaskedEditRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            size: format!("{edge}x{edge}"),
            image_png: Arc::clone(&request.image_png),
            mask_png,
        })
    }
}

impl ProviderClient for OpenAiEditClient {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn attempt(&self, request: &ProviderRequest) -> AttemptFuture<'_> {
        let body = self.build_request(request);
        Box::pin(async move {
            let form = body?.into_form()?;

            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .multipart(form)
                .send()
                .await?;

            let response_text = read_success_body(response).await?;
            parse_response(&response_text)
        })
    }
}

fn parse_response(body: &str) -> Result<crate::ports::GeneratedImage, ProviderFailure> {
    let parsed: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
        ProviderFailure::InvalidResponse { message: format!("Failed to parse response: {e}") }
    })?;
    let b64 = parsed
        .data
        .into_iter()
        .find_map(|item| item.b64_json)
        .ok_or_else(|| ProviderFailure::InvalidResponse {
            message: format!("No b64_json in response. Body: {}", super::excerpt(body)),
        })?;
    decode_image_payload(&b64)
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
}
