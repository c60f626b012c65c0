//! Compaction and node status views

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An active compaction on a node
///
/// The live management view and the stored history share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compaction {
    /// Compaction id
    pub id: String,
    /// Compaction type (e.g. `Compaction`, `Validation`)
    pub kind: String,
    /// Keyspace name
    pub keyspace: String,
    /// Table name
    pub table: String,
    /// Units completed so far
    pub progress: u64,
    /// Total units
    pub total: u64,
    /// Unit of `progress` and `total` (usually `bytes`)
    pub unit: String,
}

impl Compaction {
    /// Completion ratio in [0, 1]
    pub fn completion(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.progress as f64 / self.total as f64).min(1.0)
    }
}

/// Gossip view of every node, as seen by one host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesStatus {
    /// Host that answered
    pub host: String,
    /// Raw endpoint state per endpoint
    pub endpoint_states: HashMap<String, String>,
    /// `UP`/`DOWN` per endpoint
    pub simple_states: HashMap<String, String>,
}
