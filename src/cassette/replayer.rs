//! Serves recorded outputs back in order.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::format::{Cassette, Port};
use crate::error::PhotoError;

/// One queue per port and method, so calls on different ports may interleave
/// freely during replay.
#[derive(Debug)]
pub struct CassetteReplayer {
    name: String,
    queues: HashMap<(Port, String), VecDeque<Value>>,
}

impl CassetteReplayer {
    /// Index a loaded cassette by port and method, keeping recording order.
    #[must_use]
    pub fn new(mut cassette: Cassette) -> Self {
        cassette.interactions.sort_by_key(|i| i.seq);
        let mut queues: HashMap<(Port, String), VecDeque<Value>> = HashMap::new();
        for interaction in cassette.interactions {
            queues
                .entry((interaction.port, interaction.method))
                .or_default()
                .push_back(interaction.output);
        }
        Self { name: cassette.name, queues }
    }

    /// Take the next recorded output for `port` and `method`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::Config`] when the cassette has no (more) outputs
    /// for that pair.
    pub fn next_output(&mut self, port: Port, method: &str) -> Result<Value, PhotoError> {
        self.queues
            .get_mut(&(port, method.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                PhotoError::Config(format!(
                    "Cassette '{}' exhausted: no recorded {port}::{method} call left",
                    self.name
                ))
            })
    }

    /// Outputs not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
