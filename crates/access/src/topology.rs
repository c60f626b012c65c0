//! Read-only cluster introspection
//!
//! Every query has the same shape: pick an endpoint through the selector
//! (sidecar aware), issue one management call, hand back the result.
//! The connection is dropped when the query returns.

use num_bigint::BigInt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::AccessResult;
use crate::management::{ManagementConnection, RangeToEndpointMap};
use crate::metadata::{Cluster, Node, NodesStatus};
use crate::selector::EndpointSelector;

/// Topology queries
#[derive(Clone)]
pub struct TopologyQueries {
    selector: EndpointSelector,
}

impl TopologyQueries {
    pub fn new(selector: EndpointSelector) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &EndpointSelector {
        &self.selector
    }

    /// Cluster name, asked to any of the endpoints
    pub async fn cluster_name<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<String> {
        let conn = self.selector.connect_allow_sidecar(cluster, endpoints).await?;
        Ok(conn.cluster_name().await?)
    }

    /// Name of the cluster a node belongs to, asked to the node itself
    pub async fn cluster_name_of(&self, node: &Node) -> AccessResult<String> {
        let conn = self.selector.connect_node(node).await?;
        Ok(conn.cluster_name().await?)
    }

    pub async fn partitioner<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<String> {
        let conn = self.selector.connect_allow_sidecar(cluster, endpoints).await?;
        Ok(conn.partitioner().await?)
    }

    /// Live nodes, asked to the seed hosts
    pub async fn live_nodes(&self, cluster: &Arc<Cluster>) -> AccessResult<Vec<String>> {
        self.live_nodes_from(cluster, &cluster.seeds()).await
    }

    pub async fn live_nodes_from<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<Vec<String>> {
        let conn = self.selector.connect_allow_sidecar(cluster, endpoints).await?;
        Ok(conn.live_nodes().await?)
    }

    /// Failure detector view of all nodes
    pub async fn nodes_status<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<NodesStatus> {
        let conn = self.selector.connect_allow_sidecar(cluster, endpoints).await?;
        Ok(NodesStatus {
            host: conn.host().to_string(),
            endpoint_states: conn.endpoint_states().await?,
            simple_states: conn.simple_states().await?,
        })
    }

    /// Cassandra version, asked to the seed hosts
    pub async fn cassandra_version(&self, cluster: &Arc<Cluster>) -> AccessResult<String> {
        self.cassandra_version_from(cluster, &cluster.seeds()).await
    }

    pub async fn cassandra_version_from<S: AsRef<str>>(
        &self,
        cluster: &Arc<Cluster>,
        endpoints: &[S],
    ) -> AccessResult<String> {
        let conn = self.selector.connect_allow_sidecar(cluster, endpoints).await?;
        Ok(conn.cassandra_version().await?)
    }

    /// All tokens of the ring
    pub async fn tokens(&self, cluster: &Arc<Cluster>) -> AccessResult<Vec<BigInt>> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.tokens().await?)
    }

    /// Token ranges of a keyspace with their replicas
    pub async fn range_to_endpoint_map(
        &self,
        cluster: &Arc<Cluster>,
        keyspace: &str,
    ) -> AccessResult<RangeToEndpointMap> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.range_to_endpoint_map(keyspace).await?)
    }

    pub async fn table_names(
        &self,
        cluster: &Arc<Cluster>,
        keyspace: &str,
    ) -> AccessResult<BTreeSet<String>> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.table_names(keyspace).await?)
    }

    pub async fn keyspaces(&self, cluster: &Arc<Cluster>) -> AccessResult<Vec<String>> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.keyspaces().await?)
    }

    pub async fn endpoint_to_host_id(
        &self,
        cluster: &Arc<Cluster>,
    ) -> AccessResult<HashMap<String, String>> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.endpoint_to_host_id().await?)
    }

    /// Datacenter of an endpoint, asked to any reachable seed
    pub async fn datacenter(&self, cluster: &Arc<Cluster>, endpoint: &str) -> AccessResult<String> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.datacenter_of(endpoint).await?)
    }

    /// Datacenter of a node, asked to the node itself
    pub async fn datacenter_of(&self, node: &Node) -> AccessResult<String> {
        let conn = self.selector.connect_node(node).await?;
        Ok(conn.local_datacenter().await?)
    }

    /// Endpoint identifying the node in the cluster
    pub async fn local_endpoint(&self, node: &Node) -> AccessResult<String> {
        let conn = self.selector.connect_node(node).await?;
        Ok(conn.local_endpoint().await?)
    }

    /// Tokens owned by each node
    pub async fn tokens_by_node(
        &self,
        cluster: &Arc<Cluster>,
    ) -> AccessResult<HashMap<String, Vec<String>>> {
        let conn = self.seed_connection(cluster).await?;
        Ok(conn.tokens_by_node().await?)
    }

    async fn seed_connection(
        &self,
        cluster: &Arc<Cluster>,
    ) -> AccessResult<Box<dyn ManagementConnection>> {
        self.selector
            .connect_allow_sidecar(cluster, &cluster.seeds())
            .await
    }
}
