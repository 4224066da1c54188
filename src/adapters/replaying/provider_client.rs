//! Replaying adapter for the `ProviderClient` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ProviderFailure;
use crate::model::ProviderId;
use crate::ports::provider_client::{AttemptFuture, ProviderClient, ProviderRequest};

/// Serves recorded attempt outcomes for one provider.
pub struct ReplayingProviderClient {
    id: ProviderId,
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingProviderClient {
    /// Create a replaying client for `id` backed by the given replayer.
    #[must_use]
    pub fn new(id: ProviderId, replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { id, replayer }
    }
}

impl ProviderClient for ReplayingProviderClient {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn attempt(&self, _request: &ProviderRequest) -> AttemptFuture<'_> {
        let output = next_output(&self.replayer, self.id.as_str(), "attempt");
        Box::pin(async move {
            let Some(output) = output else {
                return Err(ProviderFailure::Transport {
                    message: format!("cassette exhausted for provider '{}'", self.id),
                });
            };
            replay_result(output)
                .unwrap_or_else(|message| Err(ProviderFailure::InvalidResponse { message }))
        })
    }
}
