//! Per-attempt deadline for provider clients.

use std::time::Duration;

use crate::error::ProviderFailure;
use crate::model::ProviderId;
use crate::ports::provider_client::{AttemptFuture, ProviderClient, ProviderRequest};

/// Bound `call` by `limit`; expiry becomes [`ProviderFailure::TimedOut`].
///
/// The deadline starts when this is called, not when the future is first polled.
pub fn bounded(limit: Duration, call: AttemptFuture<'_>) -> AttemptFuture<'_> {
    let timed = tokio::time::timeout(limit, call);
    Box::pin(async move {
        timed
            .await
            .unwrap_or_else(|_| Err(ProviderFailure::TimedOut { seconds: limit.as_secs() }))
    })
}

/// Applies a deadline to every attempt of an inner client.
///
/// Placed under the recorder so a timed-out attempt still reaches the cassette.
pub struct TimeoutProviderClient {
    inner: Box<dyn ProviderClient>,
    limit: Duration,
}

impl TimeoutProviderClient {
    /// Wrap `inner` with a per-attempt `limit`.
    #[must_use]
    pub fn new(inner: Box<dyn ProviderClient>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl ProviderClient for TimeoutProviderClient {
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn attempt(&self, request: &ProviderRequest) -> AttemptFuture<'_> {
        bounded(self.limit, self.inner.attempt(request))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ports::GeneratedImage;

    struct Slow(Duration);

    impl ProviderClient for Slow {
        fn id(&self) -> ProviderId {
            ProviderId::OpenAi
        }

        fn attempt(&self, _request: &ProviderRequest) -> AttemptFuture<'_> {
            let delay = self.0;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(GeneratedImage { data: vec![1], mime_type: "image/png".into() })
            })
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            subject: "Collin Morikawa".into(),
            prompt: "p".into(),
            edge: 8,
            image_png: Arc::from(vec![0u8; 1]),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out() {
        let slow = Box::new(Slow(Duration::from_secs(90)));
        let client = TimeoutProviderClient::new(slow, Duration::from_secs(30));
        assert_eq!(client.id(), ProviderId::OpenAi);
        let result = client.attempt(&request()).await;
        assert!(matches!(result, Err(ProviderFailure::TimedOut { seconds: 30 })));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_attempt_passes_through() {
        let quick = Box::new(Slow(Duration::from_secs(1)));
        let client = TimeoutProviderClient::new(quick, Duration::from_secs(30));
        assert!(client.attempt(&request()).await.is_ok());
    }
}
