//! Endpoint selection
//!
//! Turns a list of candidate endpoints into a live management connection.
//! In sidecar mode the candidates are always replaced by the co-located
//! node, so a sidecar never reaches out to a remote node.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::management::{ManagementClient, ManagementConnection};
use crate::metadata::{Cluster, Node};

/// Loopback address used by sidecars without an enforced local node
pub const LOCALHOST: &str = "127.0.0.1";

/// Endpoints to actually contact
///
/// Outside sidecar mode the list is kept as is. A sidecar always gets a
/// single endpoint: the enforced local node, or loopback.
pub fn enforce_local_node<S: AsRef<str>>(
    sidecar: bool,
    enforced_local_node: Option<&str>,
    endpoints: &[S],
) -> Vec<String> {
    if sidecar {
        vec![enforced_local_node.unwrap_or(LOCALHOST).to_string()]
    } else {
        endpoints.iter().map(|e| e.as_ref().to_string()).collect()
    }
}

/// Management endpoint selector
#[derive(Clone)]
pub struct EndpointSelector {
    client: Arc<dyn ManagementClient>,
    sidecar: bool,
    enforced_local_node: Option<String>,
    connect_timeout: Duration,
}

impl EndpointSelector {
    pub fn new(client: Arc<dyn ManagementClient>, config: &AccessConfig) -> Self {
        Self {
            client,
            sidecar: config.is_in_sidecar_mode(),
            enforced_local_node: config.enforced_local_node.clone(),
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn is_sidecar(&self) -> bool {
        self.sidecar
    }

    /// Replace the endpoints with the local node in sidecar mode
    pub fn enforce_local_node_for_sidecar<S: AsRef<str>>(&self, endpoints: &[S]) -> Vec<String> {
        enforce_local_node(self.sidecar, self.enforced_local_node.as_deref(), endpoints)
    }

    /// Connect to any of the endpoints, enforcing the local node in sidecar mode
    pub async fn connect_allow_sidecar<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<Box<dyn ManagementConnection>> {
        let endpoints = self.enforce_local_node_for_sidecar(endpoints);
        self.connect_any(cluster, &endpoints).await
    }

    /// Warm up a connection ahead of scheduled work
    ///
    /// Not allowed in sidecar mode, there is nothing to pre-heat.
    pub async fn pre_heat<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<Box<dyn ManagementConnection>> {
        if self.sidecar {
            return Err(AccessError::PolicyViolation(
                "connection pre-heating is not allowed in sidecar mode".to_string(),
            ));
        }
        self.connect_any(cluster, endpoints).await
    }

    /// Connect to the first reachable endpoint, in the given order
    ///
    /// The connect timeout bounds each candidate on its own.
    pub async fn connect_any<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<Box<dyn ManagementConnection>> {
        let nodes: Vec<Node> = endpoints
            .iter()
            .map(|host| Node::new(cluster.clone(), host.as_ref()))
            .collect();
        debug!(
            "Connecting to any of {} endpoints of cluster {}",
            nodes.len(),
            cluster.name
        );

        Ok(self.client.connect_any(&nodes, self.connect_timeout).await?)
    }

    /// Connect directly to one node
    ///
    /// A timed out attempt is reported as an interruption.
    pub async fn connect_node(&self, node: &Node) -> AccessResult<Box<dyn ManagementConnection>> {
        match timeout(self.connect_timeout, self.client.connect(node)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AccessError::Interrupted(format!(
                "timed out after {:?} connecting to {}",
                self.connect_timeout, node
            ))),
        }
    }
}
