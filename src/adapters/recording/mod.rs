//! Recording adapters that capture interactions to cassettes.

pub mod provider_client;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

/// Encode a `Result<T, E>` using the `Ok` / `Err` cassette convention.
fn outcome_value<T: Serialize, E: Serialize>(result: &Result<T, E>) -> serde_json::Result<Value> {
    match result {
        Ok(v) => serde_json::to_value(v).map(|inner| json!({ "Ok": inner })),
        Err(e) => serde_json::to_value(e).map(|inner| json!({ "Err": inner })),
    }
}

/// An interaction registered with the recorder but not yet resolved.
///
/// Dropping it unresolved records the `abandoned` outcome, so a timed-out or
/// cancelled call still occupies its place in the cassette. Recording is best
/// effort: serialization and lock failures are logged, never propagated.
pub(crate) struct PendingInteraction<'a> {
    recorder: &'a Arc<Mutex<CassetteRecorder>>,
    seq: Option<u64>,
    abandoned: Value,
}

impl<'a> PendingInteraction<'a> {
    /// Register a call to `port.method` with `input`.
    pub(crate) fn begin<I, T, E>(
        recorder: &'a Arc<Mutex<CassetteRecorder>>,
        port: &str,
        method: &str,
        input: &I,
        abandoned: &Result<T, E>,
    ) -> Self
    where
        I: Serialize,
        T: Serialize,
        E: Serialize,
    {
        let encoded =
            serde_json::to_value(input).and_then(|i| outcome_value(abandoned).map(|a| (i, a)));
        let (input, abandoned) = match encoded {
            Ok(pair) => pair,
            Err(e) => {
                warn!(port, method, error = %e, "failed to serialize interaction, not recorded");
                return Self { recorder, seq: None, abandoned: Value::Null };
            }
        };
        let seq = match recorder.lock() {
            Ok(mut guard) => Some(guard.begin(port, method, input)),
            Err(e) => {
                warn!(port, method, error = %e, "recorder lock poisoned, interaction dropped");
                None
            }
        };
        Self { recorder, seq, abandoned }
    }

    /// Resolve the interaction with the call's actual result.
    pub(crate) fn complete<T: Serialize, E: Serialize>(mut self, result: &Result<T, E>) {
        match outcome_value(result) {
            Ok(output) => self.store(output),
            Err(e) => warn!(error = %e, "failed to serialize outcome, recording as abandoned"),
        }
    }

    fn store(&mut self, output: Value) {
        let Some(seq) = self.seq.take() else { return };
        match self.recorder.lock() {
            Ok(mut guard) => guard.complete(seq, output),
            Err(e) => warn!(seq, error = %e, "recorder lock poisoned, outcome dropped"),
        }
    }
}

impl Drop for PendingInteraction<'_> {
    fn drop(&mut self) {
        let abandoned = std::mem::take(&mut self.abandoned);
        self.store(abandoned);
    }
}
