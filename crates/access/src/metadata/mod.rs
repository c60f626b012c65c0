//! Cluster metadata definitions
//!
//! Contains the value types shared by every access path: clusters, nodes,
//! repair segments and compaction descriptions

mod cluster;
mod compaction;

pub use cluster::{Cluster, Node, Segment};
pub use compaction::{Compaction, NodesStatus};
