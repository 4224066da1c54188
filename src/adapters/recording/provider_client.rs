//! Recording adapter for the `ProviderClient` port.

use std::sync::{Arc, Mutex};

use super::PendingInteraction;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::ProviderFailure;
use crate::model::ProviderId;
use crate::ports::provider_client::{AttemptFuture, ProviderClient, ProviderRequest};
use crate::ports::GeneratedImage;

/// Records provider attempts while delegating to an inner client.
///
/// The attempt is registered as soon as it is made. If its future is dropped
/// before resolving, the cassette gets a transport failure in its place.
pub struct RecordingProviderClient {
    inner: Box<dyn ProviderClient>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProviderClient {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn ProviderClient>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ProviderClient for RecordingProviderClient {
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn attempt(&self, request: &ProviderRequest) -> AttemptFuture<'_> {
        let abandoned: Result<GeneratedImage, ProviderFailure> = Err(ProviderFailure::Transport {
            message: "attempt abandoned before completing".into(),
        });
        let port = self.id().as_str();
        let pending =
            PendingInteraction::begin(&self.recorder, port, "attempt", request, &abandoned);
        let call = self.inner.attempt(request);
        Box::pin(async move {
            let result = call.await;
            pending.complete(&result);
            result
        })
    }
}
