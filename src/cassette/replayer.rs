//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Serves interactions from a loaded cassette, sequentially per port/method pair.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Whether any interaction was recorded for `port`.
    #[must_use]
    pub fn has_port(&self, port: &str) -> bool {
        self.queues.keys().any(|k| k.port == port)
    }

    /// Return the next interaction for the given port and method, or `None`
    /// once the recorded queue is exhausted.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Option<&Interaction> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };
        let queue = self.queues.get(&key)?;
        let cursor = self.cursors.get_mut(&key)?;
        let interaction = queue.get(*cursor)?;
        *cursor += 1;
        Some(interaction)
    }
}
