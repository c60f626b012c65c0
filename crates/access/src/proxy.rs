//! Cluster access facade
//!
//! Wires the policy, the selector and the query components from one
//! immutable configuration. All collaborators are passed in explicitly.

use std::sync::Arc;

use tracing::info;

use crate::compaction::CompactionDispatcher;
use crate::config::AccessConfig;
use crate::management::ManagementClient;
use crate::policy::{AccessPolicy, AccessibleDatacenters};
use crate::resolver::RangeResolver;
use crate::selector::EndpointSelector;
use crate::storage::CompactionStore;
use crate::topology::TopologyQueries;

/// Cluster access facade
#[derive(Clone)]
pub struct ClusterProxy {
    config: Arc<AccessConfig>,
    policy: AccessPolicy,
    selector: EndpointSelector,
    topology: TopologyQueries,
    resolver: RangeResolver,
    compactions: CompactionDispatcher,
}

impl ClusterProxy {
    /// Create the facade
    ///
    /// `accessible_datacenters` stays shared with whoever probes datacenter
    /// reachability; `history` decides once whether a fallback store exists.
    pub fn new(
        config: AccessConfig,
        accessible_datacenters: AccessibleDatacenters,
        client: Arc<dyn ManagementClient>,
        history: Option<Arc<dyn CompactionStore>>,
    ) -> Self {
        let policy = AccessPolicy::from_config(&config, accessible_datacenters);
        let selector = EndpointSelector::new(client, &config);
        let topology = TopologyQueries::new(selector.clone());
        let resolver = RangeResolver::new(topology.clone());
        let compactions = CompactionDispatcher::new(topology.clone(), policy.clone(), history);

        info!(
            "Cluster access initialized: availability={}, sidecar={}, local_dc={}, history={}",
            config.datacenter_availability,
            config.is_in_sidecar_mode(),
            config.local_datacenter.as_deref().unwrap_or("unknown"),
            compactions.has_history()
        );

        Self {
            config: Arc::new(config),
            policy,
            selector,
            topology,
            resolver,
            compactions,
        }
    }

    /// Create the facade, seeding accessible datacenters from configuration
    ///
    /// The local datacenter, when configured, starts out accessible.
    pub fn from_config(
        config: AccessConfig,
        client: Arc<dyn ManagementClient>,
        history: Option<Arc<dyn CompactionStore>>,
    ) -> Self {
        let accessible = AccessibleDatacenters::new(config.initial_accessible_datacenters());
        Self::new(config, accessible, client, history)
    }

    /// Get configuration
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn selector(&self) -> &EndpointSelector {
        &self.selector
    }

    pub fn topology(&self) -> &TopologyQueries {
        &self.topology
    }

    pub fn resolver(&self) -> &RangeResolver {
        &self.resolver
    }

    pub fn compactions(&self) -> &CompactionDispatcher {
        &self.compactions
    }

    /// Check if a node can be reached directly
    pub fn is_directly_accessible(&self, node_dc: &str, node_address: &str) -> bool {
        self.policy.is_directly_accessible(node_dc, node_address)
    }
}
