//! Provider fallback chain.
//!
//! Providers are tried one at a time in priority order. The first success
//! wins; every failure is classified and logged, and when the chain runs out
//! the local composite card is rendered instead.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::adapters::timeout::bounded;
use crate::composite::compose_fallback_card;
use crate::error::{PhotoError, ProviderFailure};
use crate::model::{FailureReason, GenerationResult, ProviderConfig};
use crate::params::fallback_caption;
use crate::ports::{GeneratedImage, ProviderClient, ProviderRequest};

/// A provider's configuration paired with its client, if one could be built.
pub struct ProviderSlot {
    /// Read-only provider settings.
    pub config: ProviderConfig,
    /// `None` when the provider has no credential.
    pub client: Option<Box<dyn ProviderClient>>,
}

impl ProviderSlot {
    /// Pair `config` with `client`.
    #[must_use]
    pub fn new(config: ProviderConfig, client: Option<Box<dyn ProviderClient>>) -> Self {
        Self { config, client }
    }

    /// The client to call, if the provider is enabled.
    fn callable(&self) -> Option<&dyn ProviderClient> {
        self.client.as_deref().filter(|_| self.config.enabled)
    }
}

/// Walks the provider list and falls back to the local composite.
pub struct FallbackOrchestrator {
    slots: Vec<ProviderSlot>,
    attempt_timeout: Duration,
    subtitle: String,
}

impl FallbackOrchestrator {
    /// Build an orchestrator. Slots are ordered by priority; ties keep their given order.
    #[must_use]
    pub fn new(mut slots: Vec<ProviderSlot>, attempt_timeout: Duration, subtitle: String) -> Self {
        slots.sort_by_key(|s| s.config.priority);
        Self { slots, attempt_timeout, subtitle }
    }

    /// Provider plan in the order attempts are made.
    #[must_use]
    pub fn plan(&self) -> Vec<ProviderConfig> {
        self.slots.iter().map(|s| s.config).collect()
    }

    /// Produce exactly one result for `request`.
    ///
    /// Provider failures never surface here. `photo` is the normalized square
    /// used for the local composite.
    ///
    /// # Errors
    ///
    /// Returns an error only if rendering the local composite fails.
    pub async fn run(
        &self,
        request: &ProviderRequest,
        photo: &Arc<RgbaImage>,
    ) -> Result<GenerationResult, PhotoError> {
        let mut configured = 0usize;
        let mut failures = Vec::new();

        for slot in &self.slots {
            let id = slot.config.id;
            let Some(client) = slot.callable() else {
                debug!(provider = %id, "no credentials, skipping");
                continue;
            };
            configured += 1;
            if slot.config.bypass {
                info!(provider = %id, "provider bypassed by configuration");
                continue;
            }

            match self.attempt(client, request).await {
                Ok(image) => {
                    info!(provider = %id, bytes = image.data.len(), "provider succeeded");
                    return Ok(GenerationResult::Success { image, provider: id });
                }
                Err(failure) => {
                    let reason = failure.reason();
                    warn!(provider = %id, %reason, error = %failure, "provider attempt failed");
                    failures.push(reason);
                }
            }
        }

        let reason = fallback_reason(configured, &failures);
        info!(%reason, subject = %request.subject, "using local composite");
        let image = self.compose(&request.subject, photo).await?;
        Ok(GenerationResult::Fallback { image, reason })
    }

    async fn attempt(
        &self,
        client: &dyn ProviderClient,
        request: &ProviderRequest,
    ) -> Result<GeneratedImage, ProviderFailure> {
        bounded(self.attempt_timeout, client.attempt(request)).await
    }

    async fn compose(&self, subject: &str, photo: &Arc<RgbaImage>) -> Result<Vec<u8>, PhotoError> {
        let photo = Arc::clone(photo);
        let caption = fallback_caption(subject);
        let subtitle = self.subtitle.clone();
        tokio::task::spawn_blocking(move || compose_fallback_card(&photo, &caption, &subtitle))
            .await
            .map_err(|e| PhotoError::Internal(format!("composite task failed: {e}")))?
            .map_err(PhotoError::from)
    }
}

/// Reason reported with a fallback result.
///
/// `configured` counts providers with credentials, bypassed or not.
/// `failures` holds the classified reason of every attempt actually made.
#[must_use]
pub fn fallback_reason(configured: usize, failures: &[FailureReason]) -> FailureReason {
    if configured == 0 {
        FailureReason::MissingCredentials
    } else if failures.is_empty() {
        FailureReason::AllBypassed
    } else if failures.iter().all(|r| *r == FailureReason::InvalidUpstreamResponse) {
        FailureReason::InvalidUpstreamResponse
    } else {
        FailureReason::UpstreamRejected
    }
}
