//! Cluster-wide totals

use serde::{Deserialize, Serialize};

use crate::models::NodeStat;

/// Allocatable, requested and used totals across all nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub node_count: usize,
    pub cpu_alloc_milli: i64,
    pub cpu_req_milli: i64,
    pub cpu_used_milli: i64,
    pub mem_alloc_mi: i64,
    pub mem_req_mi: i64,
    pub mem_used_mi: i64,
}

impl ClusterSummary {
    pub fn from_node_stats(nodes: &[NodeStat]) -> Self {
        nodes.iter().fold(Self::default(), |acc, n| Self {
            node_count: acc.node_count + 1,
            cpu_alloc_milli: acc.cpu_alloc_milli.saturating_add(n.cpu_alloc_milli),
            cpu_req_milli: acc.cpu_req_milli.saturating_add(n.cpu_req_milli),
            cpu_used_milli: acc.cpu_used_milli.saturating_add(n.cpu_used_milli),
            mem_alloc_mi: acc.mem_alloc_mi.saturating_add(n.mem_alloc_mi),
            mem_req_mi: acc.mem_req_mi.saturating_add(n.mem_req_mi),
            mem_used_mi: acc.mem_used_mi.saturating_add(n.mem_used_mi),
        })
    }
}
