//! Active compaction dispatch
//!
//! Compactions are read from the node itself when the access policy allows
//! a direct connection, and from the compaction history store otherwise.
//! Both sources yield the same [`Compaction`] shape.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AccessResult;
use crate::metadata::{Compaction, Node};
use crate::policy::AccessPolicy;
use crate::storage::{CompactionStore, StorageError};
use crate::topology::TopologyQueries;

/// Chooses between live and stored compaction views
#[derive(Clone)]
pub struct CompactionDispatcher {
    topology: TopologyQueries,
    policy: AccessPolicy,
    history: Option<Arc<dyn CompactionStore>>,
}

impl CompactionDispatcher {
    pub fn new(
        topology: TopologyQueries,
        policy: AccessPolicy,
        history: Option<Arc<dyn CompactionStore>>,
    ) -> Self {
        Self {
            topology,
            policy,
            history,
        }
    }

    /// Whether a history store backs the fallback path
    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    /// Active compactions of a node, live when reachable, stored otherwise
    pub async fn list_active_compactions(&self, node: &Node) -> AccessResult<Vec<Compaction>> {
        let node_dc = self.topology.datacenter_of(node).await?;

        if self.policy.is_directly_accessible(&node_dc, node.hostname()) {
            self.list_active_compactions_direct(node).await
        } else {
            info!(
                "Node {} in DC {} is not directly accessible, reading stored compactions",
                node.hostname(),
                node_dc
            );
            self.list_stored_compactions(node).await
        }
    }

    /// Active compactions read from the node itself
    ///
    /// Connects sidecar aware, but only ever to this one node.
    pub async fn list_active_compactions_direct(&self, node: &Node) -> AccessResult<Vec<Compaction>> {
        let conn = self
            .topology
            .selector()
            .connect_allow_sidecar(node.cluster(), &[node.hostname()])
            .await?;
        let compactions = conn.active_compactions().await?;
        debug!(
            "Node {} reports {} active compactions",
            node.hostname(),
            compactions.len()
        );
        for compaction in &compactions {
            debug!(
                "  {} {} on {}.{}: {:.1}%",
                compaction.id,
                compaction.kind,
                compaction.keyspace,
                compaction.table,
                compaction.completion() * 100.0
            );
        }
        Ok(compactions)
    }

    /// Last compactions stored for the node
    pub async fn list_stored_compactions(&self, node: &Node) -> AccessResult<Vec<Compaction>> {
        let history = self.history.as_ref().ok_or(StorageError::Unavailable)?;
        Ok(history
            .list_compactions(&node.cluster().name, node.hostname())
            .await?)
    }

    /// Read the live compactions of a node and store them as its latest view
    pub async fn record_active_compactions(&self, node: &Node) -> AccessResult<usize> {
        let history = self.history.as_ref().ok_or(StorageError::Unavailable)?;
        let compactions = self.list_active_compactions_direct(node).await?;
        let count = compactions.len();
        history
            .store_compactions(&node.cluster().name, node.hostname(), compactions)
            .await?;
        Ok(count)
    }
}
