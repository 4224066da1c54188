//! Per-request pipeline: validate, normalize, then run the provider chain.

use std::time::Duration;

use tracing::debug;

use crate::codec::{self, PreparedImage};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::PhotoError;
use crate::model::{GenerationRequest, GenerationResult, ProviderConfig};
use crate::orchestrator::FallbackOrchestrator;
use crate::params::{build_prompt, validate_upload_size, TARGET_EDGE};
use crate::ports::ProviderRequest;
use crate::roster;

/// Validates requests and drives them through the fallback chain.
pub struct PhotoService {
    orchestrator: FallbackOrchestrator,
    max_upload_bytes: usize,
}

impl PhotoService {
    /// Create a service around an orchestrator.
    #[must_use]
    pub fn new(orchestrator: FallbackOrchestrator, max_upload_bytes: usize) -> Self {
        Self { orchestrator, max_upload_bytes }
    }

    /// Create a service from resolved settings and provider slots.
    #[must_use]
    pub fn from_context(context: ServiceContext, settings: &Settings) -> Self {
        let orchestrator = FallbackOrchestrator::new(
            context.slots,
            Duration::from_secs(settings.server.provider_timeout_secs),
            settings.card.subtitle.clone(),
        );
        Self::new(orchestrator, settings.server.max_upload_bytes)
    }

    /// Provider plan in attempt order.
    #[must_use]
    pub fn plan(&self) -> Vec<ProviderConfig> {
        self.orchestrator.plan()
    }

    /// Upload ceiling in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Cheap checks that run before any decoding or network traffic.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: missing image, unknown subject, oversize upload.
    pub fn validate(&self, request: &GenerationRequest) -> Result<(), PhotoError> {
        if request.image_bytes.is_empty() {
            return Err(PhotoError::ImageRequired);
        }
        roster::validate_subject(&request.subject_name).map_err(PhotoError::InvalidSubject)?;
        validate_upload_size(&request.image_bytes, self.max_upload_bytes)
            .map_err(|(size, limit)| {
                debug!(size, limit, "upload over limit");
                PhotoError::TooLarge { limit }
            })?;
        Ok(())
    }

    /// Run one request to completion.
    ///
    /// # Errors
    ///
    /// Returns validation and decode errors; provider failures always resolve
    /// to a fallback result instead.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, PhotoError> {
        self.validate(&request)?;

        let GenerationRequest { image_bytes, subject_name } = request;
        let prepared: PreparedImage =
            tokio::task::spawn_blocking(move || codec::prepare(&image_bytes, TARGET_EDGE))
                .await
                .map_err(|e| PhotoError::Internal(format!("decode task failed: {e}")))??;
        debug!(subject = %subject_name, png_bytes = prepared.png.len(), "upload normalized");

        let provider_request = ProviderRequest {
            prompt: build_prompt(&subject_name),
            subject: subject_name,
            edge: TARGET_EDGE,
            image_png: prepared.png,
        };
        self.orchestrator.run(&provider_request, &prepared.pixels).await
    }
}
