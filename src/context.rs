//! Service context that bundles the provider clients in priority order.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::live::openai::OpenAiEditClient;
use crate::adapters::live::stability::StabilityClient;
use crate::adapters::recording::provider_client::RecordingProviderClient;
use crate::adapters::replaying::provider_client::ReplayingProviderClient;
use crate::adapters::timeout::TimeoutProviderClient;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::{ResolvedProvider, Settings};
use crate::error::PhotoError;
use crate::model::ProviderId;
use crate::orchestrator::ProviderSlot;
use crate::ports::ProviderClient;

/// Provider slots ready to hand to the orchestrator.
pub struct ServiceContext {
    /// One slot per known provider, in priority order.
    pub slots: Vec<ProviderSlot>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// Call after the server has stopped; clients still holding the recorder
    /// make this fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        tracing::debug!(interactions = recorder.len(), "finishing recording");
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

/// Build the live client for a provider, if it has a key.
fn live_client(provider: &ResolvedProvider) -> Option<Box<dyn ProviderClient>> {
    let key = provider.api_key.clone()?;
    let client: Box<dyn ProviderClient> = match provider.config.id {
        ProviderId::OpenAi => {
            let mut client = OpenAiEditClient::new(key).with_mask_encoding(provider.mask_encoding);
            if let Some(ref endpoint) = provider.endpoint {
                client = client.with_endpoint(endpoint);
            }
            if let Some(ref model) = provider.model {
                client = client.with_model(model);
            }
            Box::new(client)
        }
        ProviderId::Stability => {
            let mut client = StabilityClient::new(key).with_strength(provider.strength);
            if let Some(ref endpoint) = provider.endpoint {
                client = client.with_endpoint(endpoint);
            }
            Box::new(client)
        }
    };
    Some(client)
}

impl ServiceContext {
    /// Live clients for every provider that has a key.
    #[must_use]
    pub fn live(settings: &Settings) -> Self {
        let slots = settings
            .providers
            .iter()
            .map(|p| ProviderSlot::new(p.config, live_client(p)))
            .collect();
        Self { slots }
    }

    /// Live clients wrapped with a recorder.
    ///
    /// The attempt deadline is applied beneath the recorder so timeouts are
    /// recorded like any other failure.
    #[must_use]
    pub fn recording(settings: &Settings) -> (Self, RecordingSession) {
        let attempt_timeout = Duration::from_secs(settings.server.provider_timeout_secs);
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".photogen/cassettes")
            .join(&timestamp)
            .join("providers.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-providers"),
            get_commit_hash(),
        )));

        let slots = settings
            .providers
            .iter()
            .map(|p| {
                let client = live_client(p).map(|inner| {
                    let timed = Box::new(TimeoutProviderClient::new(inner, attempt_timeout));
                    Box::new(RecordingProviderClient::new(timed, Arc::clone(&recorder)))
                        as Box<dyn ProviderClient>
                });
                ProviderSlot::new(p.config, client)
            })
            .collect();

        (Self { slots }, RecordingSession { recorder })
    }

    /// Replaying clients for every provider present in the cassette.
    ///
    /// Such providers count as configured whether or not a key is set;
    /// priority and bypass still come from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(settings: &Settings, path: &Path) -> Result<Self, PhotoError> {
        let replayer = load_cassette(path)
            .map_err(|e| PhotoError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        let recorded = |id: ProviderId| {
            replayer.lock().map(|r| r.has_port(id.as_str())).unwrap_or(false)
        };

        let slots = settings
            .providers
            .iter()
            .map(|p| {
                let mut config = p.config;
                config.enabled = recorded(config.id);
                let client = config.enabled.then(|| {
                    Box::new(ReplayingProviderClient::new(config.id, Arc::clone(&replayer)))
                        as Box<dyn ProviderClient>
                });
                ProviderSlot::new(config, client)
            })
            .collect();
        Ok(Self { slots })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let pairs: Vec<(String, String)> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::default()
            .resolve_with(|name| pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()))
            .unwrap()
    }

    #[test]
    fn live_builds_clients_only_for_keyed_providers() {
        let ctx = ServiceContext::live(&settings(&[("STABILITY_API_KEY", "sk")]));
        assert_eq!(ctx.slots.len(), 2);
        assert!(ctx.slots[0].client.is_none());
        assert_eq!(ctx.slots[1].client.as_ref().map(|c| c.id()), Some(ProviderId::Stability));
    }

    #[test]
    fn replaying_enables_recorded_providers() {
        let dir = std::env::temp_dir().join("photogen_context_replay_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("providers.cassette.yaml");
        let yaml = r#"name: t
recorded_at: "2026-02-01T00:00:00Z"
commit: c
interactions:
  - seq: 0
    port: openai
    method: attempt
    output:
      Err:
        kind: rejected
        status: 503
        message: down
"#;
        std::fs::write(&path, yaml).unwrap();

        let ctx = ServiceContext::replaying(&settings(&[]), &path).unwrap();
        assert!(ctx.slots[0].config.enabled);
        assert!(ctx.slots[0].client.is_some());
        assert!(!ctx.slots[1].config.enabled);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_missing_cassette_is_config_error() {
        let err = ServiceContext::replaying(&settings(&[]), Path::new("/nonexistent.yaml"));
        assert!(matches!(err, Err(PhotoError::Config(_))));
    }

    #[test]
    fn recording_session_finishes_once_clients_are_dropped() {
        let (ctx, session) = ServiceContext::recording(&settings(&[("OPENAI_API_KEY", "k")]));
        assert!(ctx.slots[0].client.is_some());
        drop(ctx);
        // Nothing recorded; finishing still writes an empty cassette.
        let path = session.finish().unwrap();
        assert!(path.exists());
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
