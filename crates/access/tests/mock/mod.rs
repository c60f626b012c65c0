// Mock management transport shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use num_bigint::BigInt;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use cluster_access::management::{
    ManagementClient, ManagementConnection, ManagementError, ManagementResult, RangeToEndpointMap,
};
use cluster_access::metadata::{Compaction, Node};

/// One simulated node
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    pub datacenter: String,
    /// Endpoint identity reported by the node
    pub endpoint: String,
    pub compactions: Vec<Compaction>,
}

impl MockNode {
    pub fn new(datacenter: &str, endpoint: &str) -> Self {
        Self {
            datacenter: datacenter.to_string(),
            endpoint: endpoint.to_string(),
            compactions: Vec::new(),
        }
    }

    pub fn with_compactions(mut self, compactions: Vec<Compaction>) -> Self {
        self.compactions = compactions;
        self
    }
}

/// How a host answers connection attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostBehavior {
    Refuse,
    Interrupt,
    Hang,
}

struct MockInner {
    cluster_name: String,
    nodes: RwLock<HashMap<String, MockNode>>,
    behaviors: RwLock<HashMap<String, HostBehavior>>,
    /// `None` makes range map calls fail
    range_map: RwLock<Option<RangeToEndpointMap>>,
    failing_compactions: RwLock<HashSet<String>>,
    connections: Mutex<Vec<String>>,
    compaction_calls: Mutex<Vec<String>>,
}

/// Management client over an in-memory cluster
#[derive(Clone)]
pub struct MockManagementClient {
    inner: Arc<MockInner>,
}

impl MockManagementClient {
    pub fn new(cluster_name: &str) -> Self {
        Self {
            inner: Arc::new(MockInner {
                cluster_name: cluster_name.to_string(),
                nodes: RwLock::new(HashMap::new()),
                behaviors: RwLock::new(HashMap::new()),
                range_map: RwLock::new(Some(RangeToEndpointMap::new())),
                failing_compactions: RwLock::new(HashSet::new()),
                connections: Mutex::new(Vec::new()),
                compaction_calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn add_node(&self, host: &str, node: MockNode) {
        self.inner.nodes.write().insert(host.to_string(), node);
    }

    pub fn set_behavior(&self, host: &str, behavior: HostBehavior) {
        self.inner
            .behaviors
            .write()
            .insert(host.to_string(), behavior);
    }

    pub fn set_range_map(&self, ranges: Vec<((&str, &str), Vec<&str>)>) {
        let map = ranges
            .into_iter()
            .map(|((start, end), endpoints)| {
                (
                    vec![start.to_string(), end.to_string()],
                    endpoints.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();
        *self.inner.range_map.write() = Some(map);
    }

    pub fn fail_range_map(&self) {
        *self.inner.range_map.write() = None;
    }

    pub fn fail_compactions(&self, host: &str) {
        self.inner.failing_compactions.write().insert(host.to_string());
    }

    /// Hosts a connection was attempted to, in order
    pub fn connections(&self) -> Vec<String> {
        self.inner.connections.lock().clone()
    }

    /// Hosts whose live compactions were requested
    pub fn compaction_calls(&self) -> Vec<String> {
        self.inner.compaction_calls.lock().clone()
    }
}

#[async_trait]
impl ManagementClient for MockManagementClient {
    async fn connect(&self, node: &Node) -> ManagementResult<Box<dyn ManagementConnection>> {
        let host = node.hostname().to_string();
        self.inner.connections.lock().push(host.clone());

        let behavior = self.inner.behaviors.read().get(&host).copied();
        match behavior {
            Some(HostBehavior::Interrupt) => {
                return Err(ManagementError::Interrupted(format!("connecting to {}", host)));
            }
            Some(HostBehavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Some(HostBehavior::Refuse) => {
                return Err(ManagementError::Unreachable {
                    endpoints: vec![host],
                    reason: "connection refused".to_string(),
                });
            }
            None => {}
        }

        if !self.inner.nodes.read().contains_key(&host) {
            return Err(ManagementError::Unreachable {
                endpoints: vec![host],
                reason: "unknown host".to_string(),
            });
        }

        Ok(Box::new(MockConnection {
            host,
            inner: self.inner.clone(),
        }))
    }
}

struct MockConnection {
    host: String,
    inner: Arc<MockInner>,
}

impl MockConnection {
    fn node(&self) -> ManagementResult<MockNode> {
        self.inner
            .nodes
            .read()
            .get(&self.host)
            .cloned()
            .ok_or_else(|| ManagementError::Introspection(format!("{} vanished", self.host)))
    }

    fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self
            .inner
            .nodes
            .read()
            .values()
            .map(|n| n.endpoint.clone())
            .collect();
        endpoints.sort();
        endpoints
    }
}

#[async_trait]
impl ManagementConnection for MockConnection {
    fn host(&self) -> &str {
        &self.host
    }

    async fn cluster_name(&self) -> ManagementResult<String> {
        Ok(self.inner.cluster_name.clone())
    }

    async fn partitioner(&self) -> ManagementResult<String> {
        Ok("org.apache.cassandra.dht.Murmur3Partitioner".to_string())
    }

    async fn live_nodes(&self) -> ManagementResult<Vec<String>> {
        Ok(self.endpoints())
    }

    async fn cassandra_version(&self) -> ManagementResult<String> {
        Ok("4.1.3".to_string())
    }

    async fn tokens(&self) -> ManagementResult<Vec<BigInt>> {
        Ok(vec![BigInt::from(-100), BigInt::from(0), BigInt::from(100)])
    }

    async fn keyspaces(&self) -> ManagementResult<Vec<String>> {
        Ok(vec!["system".to_string(), "ks".to_string()])
    }

    async fn table_names(&self, keyspace: &str) -> ManagementResult<BTreeSet<String>> {
        match keyspace {
            "ks" => Ok(["events", "users"].into_iter().map(str::to_string).collect()),
            _ => Ok(BTreeSet::new()),
        }
    }

    async fn range_to_endpoint_map(&self, keyspace: &str) -> ManagementResult<RangeToEndpointMap> {
        self.inner.range_map.read().clone().ok_or_else(|| {
            ManagementError::Introspection(format!("no ranges for keyspace {}", keyspace))
        })
    }

    async fn endpoint_to_host_id(&self) -> ManagementResult<HashMap<String, String>> {
        Ok(self
            .endpoints()
            .into_iter()
            .enumerate()
            .map(|(i, e)| (e, format!("host-id-{}", i)))
            .collect())
    }

    async fn local_endpoint(&self) -> ManagementResult<String> {
        Ok(self.node()?.endpoint)
    }

    async fn local_datacenter(&self) -> ManagementResult<String> {
        Ok(self.node()?.datacenter)
    }

    async fn datacenter_of(&self, endpoint: &str) -> ManagementResult<String> {
        self.inner
            .nodes
            .read()
            .values()
            .find(|n| n.endpoint == endpoint)
            .map(|n| n.datacenter.clone())
            .ok_or_else(|| ManagementError::Introspection(format!("unknown endpoint {}", endpoint)))
    }

    async fn tokens_by_node(&self) -> ManagementResult<HashMap<String, Vec<String>>> {
        Ok(self
            .endpoints()
            .into_iter()
            .map(|e| (e, vec!["0".to_string()]))
            .collect())
    }

    async fn endpoint_states(&self) -> ManagementResult<HashMap<String, String>> {
        Ok(self
            .endpoints()
            .into_iter()
            .map(|e| (e, "STATUS:NORMAL".to_string()))
            .collect())
    }

    async fn simple_states(&self) -> ManagementResult<HashMap<String, String>> {
        Ok(self
            .endpoints()
            .into_iter()
            .map(|e| (e, "UP".to_string()))
            .collect())
    }

    async fn active_compactions(&self) -> ManagementResult<Vec<Compaction>> {
        self.inner.compaction_calls.lock().push(self.host.clone());
        if self.inner.failing_compactions.read().contains(&self.host) {
            return Err(ManagementError::Introspection(
                "CompactionManager bean unavailable".to_string(),
            ));
        }
        Ok(self.node()?.compactions)
    }
}

pub fn compaction(id: &str, keyspace: &str, table: &str) -> Compaction {
    Compaction {
        id: id.to_string(),
        kind: "Compaction".to_string(),
        keyspace: keyspace.to_string(),
        table: table.to_string(),
        progress: 512,
        total: 2048,
        unit: "bytes".to_string(),
    }
}
