//! Cluster Access - topology-aware management access for Cassandra clusters
//!
//! Decides, for every administrative query, which node to contact, whether
//! a direct management connection is allowed, and what to fall back to
//! when it is not.
//!
//! # Features
//! - Datacenter availability policy (`all`, `local`, `each`, `sidecar`)
//! - Endpoint selection with sidecar enforcement
//! - Topology introspection (tokens, keyspaces, datacenters, ...)
//! - Token range to replica resolution
//! - Live or stored active compactions
//!
//! # Usage Example
//! ```ignore
//! use cluster_access::{ClusterProxy, Config};
//!
//! let config = Config::from_file("access.yaml")?;
//! let history = cluster_access::storage::open_store(&config.storage);
//! let proxy = ClusterProxy::from_config(config.access, client, history);
//! let compactions = proxy.compactions().list_active_compactions(&node).await?;
//! ```

pub mod compaction;
pub mod config;
pub mod error;
pub mod management;
pub mod metadata;
pub mod policy;
pub mod proxy;
pub mod resolver;
pub mod ring;
pub mod selector;
pub mod storage;
pub mod topology;

// Re-export commonly used types
pub use compaction::CompactionDispatcher;
pub use config::{AccessConfig, Config, ConfigError, DatacenterAvailability};
pub use error::{AccessError, AccessResult};
pub use management::{ManagementClient, ManagementConnection, ManagementError, RangeToEndpointMap};
pub use metadata::{Cluster, Compaction, Node, NodesStatus, Segment};
pub use policy::{AccessPolicy, AccessibleDatacenters};
pub use proxy::ClusterProxy;
pub use resolver::RangeResolver;
pub use ring::{Partitioner, RingRange};
pub use selector::EndpointSelector;
pub use storage::{CompactionStore, StorageError};
pub use topology::TopologyQueries;
