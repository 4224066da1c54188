//! Replaying adapters that serve recorded interactions from cassettes.

pub mod provider_client;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
///
/// Returns `None` when the cassette has nothing left for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Option<serde_json::Value> {
    let mut guard = replayer.lock().ok()?;
    guard.next_interaction(port, method).map(|i| i.output.clone())
}

/// Deserialize a replayed output as `Result<T, E>`.
///
/// # Errors
///
/// The outer error is a description of a malformed recording.
pub(crate) fn replay_result<T, E>(output: serde_json::Value) -> Result<Result<T, E>, String>
where
    T: serde::de::DeserializeOwned,
    E: serde::de::DeserializeOwned,
{
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        return serde_json::from_value(err_val.clone()).map(Err).map_err(|e| e.to_string());
    }
    if let Some(ok_val) = output.get("Ok").or_else(|| output.get("ok")) {
        return serde_json::from_value(ok_val.clone()).map(Ok).map_err(|e| e.to_string());
    }
    Err(format!("recorded output has neither Ok nor Err: {output}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderFailure;
    use crate::ports::GeneratedImage;
    use serde_json::json;

    #[test]
    fn replays_ok_and_err() {
        let ok: Result<GeneratedImage, ProviderFailure> =
            replay_result(json!({"Ok": {"data": "AQID", "mime_type": "image/png"}})).unwrap();
        assert_eq!(ok.unwrap().data, vec![1, 2, 3]);

        let err: Result<GeneratedImage, ProviderFailure> =
            replay_result(json!({"Err": {"kind": "invalid_response", "message": "empty"}}))
                .unwrap();
        assert_eq!(err.unwrap_err(), ProviderFailure::InvalidResponse { message: "empty".into() });
    }

    #[test]
    fn malformed_output_is_reported() {
        let out: Result<Result<GeneratedImage, ProviderFailure>, String> =
            replay_result(json!({"Maybe": 1}));
        assert!(out.is_err());
    }
}
