//! Capacity analysis over a cluster snapshot
//!
//! Every function here is a pure transformation: the same snapshot always
//! yields the same output, and nothing is sorted beyond the documented
//! input/first-seen order.

mod deployments;
mod nodes;
mod ownership;
mod pods;
mod recommend;
mod summary;

#[cfg(test)]
mod test_support;

pub use deployments::{aggregate_deployments, waste_percent, DeploymentKey};
pub use nodes::{
    classify, is_ready, node_stats, CPU_SCALE_IN_THRESHOLD_PERCENT, MEM_SCALE_IN_THRESHOLD_PERCENT,
};
pub use ownership::{
    controller_kind, is_daemon_set_owned, resolve_ownership, resolve_workload_name,
    strip_generated_suffix, Ownership,
};
pub use pods::pod_records;
pub use recommend::{
    recommend, recommend_nodes, recommend_pods, severity_for_waste, DEFAULT_WASTE_THRESHOLD,
};
pub use summary::ClusterSummary;

use serde::Serialize;
use tracing::info;

use crate::models::{ClusterSnapshot, DeploymentStat, NodeStat, PodRecord, Recommendation};

/// Full analysis of one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub nodes: Vec<NodeStat>,
    pub pods: Vec<PodRecord>,
    pub deployments: Vec<DeploymentStat>,
    pub recommendations: Vec<Recommendation>,
    pub summary: ClusterSummary,
}

/// Run every analysis step over a snapshot
pub fn analyze(snapshot: &ClusterSnapshot, threshold: f64) -> Analysis {
    let nodes = node_stats(&snapshot.nodes, &snapshot.node_usage, &snapshot.pods);
    let pods = pod_records(&snapshot.pods, &snapshot.pod_usage);
    let deployments = aggregate_deployments(&pods);
    let recommendations = recommend(&nodes, &pods, threshold);
    let summary = ClusterSummary::from_node_stats(&nodes);

    info!(
        nodes = nodes.len(),
        pods = pods.len(),
        deployments = deployments.len(),
        recommendations = recommendations.len(),
        "Analysis complete"
    );

    Analysis {
        nodes,
        pods,
        deployments,
        recommendations,
        summary,
    }
}
