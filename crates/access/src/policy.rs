//! Datacenter accessibility policy
//!
//! Decides whether a node may be contacted directly through its management
//! endpoint. Every direct call that depends on node locality goes through
//! [`AccessPolicy::is_directly_accessible`].

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{AccessConfig, DatacenterAvailability};

/// Datacenters known to be reachable
///
/// Written by the connection probing side, read by the policy. Readers get
/// an immutable snapshot; a write swaps the whole set.
#[derive(Debug, Clone, Default)]
pub struct AccessibleDatacenters {
    current: Arc<RwLock<Arc<HashSet<String>>>>,
}

impl AccessibleDatacenters {
    pub fn new<I, S>(datacenters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = datacenters.into_iter().map(Into::into).collect();
        Self {
            current: Arc::new(RwLock::new(Arc::new(set))),
        }
    }

    /// Current set of accessible datacenters
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        self.current.read().clone()
    }

    /// Replace the whole set
    pub fn replace<I, S>(&self, datacenters: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = datacenters.into_iter().map(Into::into).collect();
        *self.current.write() = Arc::new(set);
    }

    /// Add one datacenter to the set
    pub fn insert(&self, datacenter: impl Into<String>) {
        let datacenter = datacenter.into();
        let mut current = self.current.write();
        if !current.contains(&datacenter) {
            let mut set = HashSet::clone(&current);
            set.insert(datacenter);
            *current = Arc::new(set);
        }
    }
}

/// Direct access policy
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    availability: DatacenterAvailability,
    local_node_address: Option<String>,
    accessible_datacenters: AccessibleDatacenters,
}

impl AccessPolicy {
    pub fn new(
        availability: DatacenterAvailability,
        local_node_address: Option<String>,
        accessible_datacenters: AccessibleDatacenters,
    ) -> Self {
        Self {
            availability,
            local_node_address,
            accessible_datacenters,
        }
    }

    /// Build the policy from access configuration
    pub fn from_config(config: &AccessConfig, accessible_datacenters: AccessibleDatacenters) -> Self {
        Self::new(
            config.datacenter_availability,
            config.local_node_address.clone(),
            accessible_datacenters,
        )
    }

    pub fn availability(&self) -> DatacenterAvailability {
        self.availability
    }

    pub fn accessible_datacenters(&self) -> &AccessibleDatacenters {
        &self.accessible_datacenters
    }

    /// Check if the node `node_address` in `node_dc` can be reached directly
    pub fn is_directly_accessible(&self, node_dc: &str, node_address: &str) -> bool {
        match self.availability {
            DatacenterAvailability::All => true,
            // Remote failures are left to the caller
            DatacenterAvailability::Local => true,
            DatacenterAvailability::Each => self.accessible_datacenters.snapshot().contains(node_dc),
            DatacenterAvailability::Sidecar => {
                self.local_node_address.as_deref() == Some(node_address)
            }
        }
    }
}
