//! Node management client capability
//!
//! The wire protocol lives outside this crate. The access layer only sees
//! these traits: a client that opens connections to nodes and the
//! connection it hands back. A connection is released when it is dropped.

use async_trait::async_trait;
use num_bigint::BigInt;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::metadata::{Compaction, Node};

/// Range boundaries (two decimal tokens) to ordered replica endpoints
pub type RangeToEndpointMap = BTreeMap<Vec<String>, Vec<String>>;

/// Management client errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManagementError {
    #[error("Unreachable endpoints {endpoints:?}: {reason}")]
    Unreachable {
        endpoints: Vec<String>,
        reason: String,
    },
    #[error("Interrupted: {0}")]
    Interrupted(String),
    #[error("Introspection failed: {0}")]
    Introspection(String),
}

pub type ManagementResult<T> = Result<T, ManagementError>;

/// Live management connection to one node
#[async_trait]
pub trait ManagementConnection: Send + Sync {
    /// Host this connection is bound to
    fn host(&self) -> &str;

    async fn cluster_name(&self) -> ManagementResult<String>;

    async fn partitioner(&self) -> ManagementResult<String>;

    async fn live_nodes(&self) -> ManagementResult<Vec<String>>;

    async fn cassandra_version(&self) -> ManagementResult<String>;

    async fn tokens(&self) -> ManagementResult<Vec<BigInt>>;

    async fn keyspaces(&self) -> ManagementResult<Vec<String>>;

    async fn table_names(&self, keyspace: &str) -> ManagementResult<BTreeSet<String>>;

    async fn range_to_endpoint_map(&self, keyspace: &str) -> ManagementResult<RangeToEndpointMap>;

    async fn endpoint_to_host_id(&self) -> ManagementResult<HashMap<String, String>>;

    /// Endpoint identity of the connected node within the cluster
    async fn local_endpoint(&self) -> ManagementResult<String>;

    /// Datacenter of the connected node
    async fn local_datacenter(&self) -> ManagementResult<String>;

    /// Datacenter of any endpoint, as known by the connected node
    async fn datacenter_of(&self, endpoint: &str) -> ManagementResult<String>;

    async fn tokens_by_node(&self) -> ManagementResult<HashMap<String, Vec<String>>>;

    /// Failure detector state per endpoint
    async fn endpoint_states(&self) -> ManagementResult<HashMap<String, String>>;

    /// `UP`/`DOWN` per endpoint
    async fn simple_states(&self) -> ManagementResult<HashMap<String, String>>;

    async fn active_compactions(&self) -> ManagementResult<Vec<Compaction>>;
}

/// Factory of management connections
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Connect to one node
    async fn connect(&self, node: &Node) -> ManagementResult<Box<dyn ManagementConnection>>;

    /// Connect to the first reachable node, trying them in order
    ///
    /// Each attempt is bounded by `attempt_timeout`; a candidate that does
    /// not answer in time is skipped like an unreachable one. An
    /// interruption aborts the whole attempt.
    async fn connect_any(
        &self,
        nodes: &[Node],
        attempt_timeout: Duration,
    ) -> ManagementResult<Box<dyn ManagementConnection>> {
        let mut last_reason = String::from("no candidate endpoints");
        for node in nodes {
            match timeout(attempt_timeout, self.connect(node)).await {
                Ok(Ok(conn)) => return Ok(conn),
                Ok(Err(ManagementError::Interrupted(msg))) => {
                    return Err(ManagementError::Interrupted(msg));
                }
                Ok(Err(e)) => {
                    debug!("Failed connecting to {}: {}", node.hostname(), e);
                    last_reason = e.to_string();
                }
                Err(_) => {
                    warn!(
                        "Connecting to {} timed out after {:?}",
                        node.hostname(),
                        attempt_timeout
                    );
                    last_reason = format!(
                        "{} timed out after {:?}",
                        node.hostname(),
                        attempt_timeout
                    );
                }
            }
        }

        Err(ManagementError::Unreachable {
            endpoints: nodes.iter().map(|n| n.hostname().to_string()).collect(),
            reason: last_reason,
        })
    }
}
