//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session of provider attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Session name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Attempts in call order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One recorded call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Global sequence number.
    pub seq: u64,
    /// Port name; for providers this is the provider id.
    pub port: String,
    /// Method name.
    pub method: String,
    /// Serialized input.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Serialized output using the `Ok` / `Err` convention.
    pub output: serde_json::Value,
}
