//! Token range to replica resolution

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{AccessError, AccessResult};
use crate::metadata::{Cluster, Segment};
use crate::ring::RingRange;
use crate::selector::LOCALHOST;
use crate::topology::TopologyQueries;

/// Resolves segments to the replicas owning them
#[derive(Clone)]
pub struct RangeResolver {
    topology: TopologyQueries,
}

impl RangeResolver {
    pub fn new(topology: TopologyQueries) -> Self {
        Self { topology }
    }

    /// Replicas of the range enclosing the segment's first token range
    ///
    /// The range map is fetched fresh on every call. An empty list means no
    /// replicas were found, either because the map could not be fetched or
    /// because no range encloses the segment (the ring may be changing).
    pub async fn token_range_to_endpoints(
        &self,
        cluster: &Arc<Cluster>,
        keyspace: &str,
        segment: &Segment,
    ) -> Vec<String> {
        let Some(target) = segment.base_range() else {
            error!("[token_range_to_endpoints] segment without token ranges");
            return Vec::new();
        };

        let ranges = match self.topology.range_to_endpoint_map(cluster, keyspace).await {
            Ok(ranges) => ranges,
            Err(e) => {
                error!(
                    "[token_range_to_endpoints] no replicas found for token range {}: {}",
                    segment, e
                );
                return Vec::new();
            }
        };

        let partitioner = cluster.token_partitioner();
        for (bounds, endpoints) in &ranges {
            let range = match RingRange::from_boundaries(bounds) {
                Ok(range) => range,
                Err(e) => {
                    warn!("Skipping range {:?} of keyspace {}: {}", bounds, keyspace, e);
                    continue;
                }
            };
            if partitioner.is_some_and(|p| !p.is_valid_range(&range)) {
                warn!(
                    "Skipping range {} of keyspace {}: tokens outside partitioner bounds",
                    range, keyspace
                );
                continue;
            }
            if range.encloses(target) {
                return endpoints.clone();
            }
        }

        error!(
            "[token_range_to_endpoints] no replicas found for token range {}",
            segment
        );
        debug!(
            "[token_range_to_endpoints] checked token ranges were {:?}",
            ranges.keys().collect::<Vec<_>>()
        );
        Vec::new()
    }

    /// Token ranges replicated on the local node
    ///
    /// Only allowed in sidecar mode.
    pub async fn ranges_for_local_endpoint(
        &self,
        cluster: &Arc<Cluster>,
        keyspace: &str,
    ) -> AccessResult<Vec<RingRange>> {
        let selector = self.topology.selector();
        if !selector.is_sidecar() {
            return Err(AccessError::PolicyViolation(
                "local endpoint ranges are only available in sidecar mode".to_string(),
            ));
        }

        let ranges = self.topology.range_to_endpoint_map(cluster, keyspace).await?;
        let conn = selector.connect_allow_sidecar(cluster, &[LOCALHOST]).await?;
        let local_endpoint = conn.local_endpoint().await?;

        let mut local_ranges = Vec::new();
        for (bounds, endpoints) in &ranges {
            if !endpoints.contains(&local_endpoint) {
                continue;
            }
            let range = RingRange::from_boundaries(bounds)
                .map_err(|e| AccessError::Introspection(e.to_string()))?;
            local_ranges.push(range);
        }

        info!(
            "Local ranges of {} for keyspace {}: {}",
            local_endpoint,
            keyspace,
            local_ranges.len()
        );
        Ok(local_ranges)
    }
}
