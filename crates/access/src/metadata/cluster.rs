//! Cluster, node and segment definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::ring::{Partitioner, RingRange};

/// Cluster descriptor
///
/// Immutable once built; share it through `Arc<Cluster>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster name
    pub name: String,
    /// Partitioner class name, if known
    pub partitioner: Option<String>,
    /// Seed hosts used as default contact points
    pub seed_hosts: BTreeSet<String>,
}

impl Cluster {
    /// Create new cluster descriptor
    pub fn new<I, S>(name: impl Into<String>, partitioner: Option<String>, seed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            partitioner,
            seed_hosts: seed_hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Seed hosts in order
    pub fn seeds(&self) -> Vec<String> {
        self.seed_hosts.iter().cloned().collect()
    }

    /// Integer-token partitioner of this cluster, when recognised
    pub fn token_partitioner(&self) -> Option<Partitioner> {
        self.partitioner
            .as_deref()
            .and_then(Partitioner::from_class_name)
    }
}

/// A node of a cluster, addressed by hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    cluster: Arc<Cluster>,
    hostname: String,
}

impl Node {
    pub fn new(cluster: Arc<Cluster>, hostname: impl Into<String>) -> Self {
        Self {
            cluster,
            hostname: hostname.into(),
        }
    }

    pub fn cluster(&self) -> &Arc<Cluster> {
        &self.cluster
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.hostname, self.cluster.name)
    }
}

/// Unit of repair work made of one or more token ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub token_ranges: Vec<RingRange>,
}

impl Segment {
    pub fn new(token_ranges: Vec<RingRange>) -> Self {
        Self { token_ranges }
    }

    /// First token range, used to locate the owning replicas
    pub fn base_range(&self) -> Option<&RingRange> {
        self.token_ranges.first()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges: Vec<String> = self.token_ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "segment[{}]", ranges.join(", "))
    }
}
