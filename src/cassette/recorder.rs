//! Collects provider attempts and writes them as a YAML cassette.
//!
//! Attempts are registered when they start and filled in when they resolve,
//! so the cassette keeps call order even when attempts overlap.

use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use super::format::{Cassette, Interaction};

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    /// Started interactions; `None` until the outcome arrives.
    entries: Vec<(Interaction, Option<Value>)>,
}

impl CassetteRecorder {
    /// Create a recorder that writes to `path` on [`finish`](Self::finish).
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), name: name.into(), commit: commit.into(), entries: Vec::new() }
    }

    /// Register an interaction that has started. Returns its sequence number.
    pub fn begin(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: Value,
    ) -> u64 {
        let seq = self.entries.len() as u64;
        let interaction = Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output: Value::Null,
        };
        self.entries.push((interaction, None));
        seq
    }

    /// Store the outcome of a started interaction. Unknown or already
    /// completed sequence numbers are ignored.
    pub fn complete(&mut self, seq: u64, output: Value) {
        let slot = usize::try_from(seq).ok().and_then(|i| self.entries.get_mut(i));
        match slot {
            Some((_, outcome @ None)) => *outcome = Some(output),
            Some(_) => warn!(seq, "interaction already completed"),
            None => warn!(seq, "unknown interaction"),
        }
    }

    /// Record an interaction whose outcome is already known.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: Value,
        output: Value,
    ) {
        let seq = self.begin(port, method, input);
        self.complete(seq, output);
    }

    /// Number of interactions started so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of interactions still waiting for an outcome.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_none()).count()
    }

    /// Write the cassette YAML file to disk.
    ///
    /// Interactions that never completed are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let pending = self.pending();
        if pending > 0 {
            warn!(pending, "dropping interactions that never completed");
        }
        let interactions = self
            .entries
            .into_iter()
            .filter_map(|(interaction, outcome)| {
                outcome.map(|output| Interaction { output, ..interaction })
            })
            .collect();
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}
