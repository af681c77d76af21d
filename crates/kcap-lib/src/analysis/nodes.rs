//! Per-node capacity aggregation and classification

use k8s_openapi::api::core::v1::{Node, Pod};
use tracing::debug;

use super::pods::requested;
use crate::models::{NodeHealth, NodeStat, NodeUsage};
use crate::quantity::{self, CPU, MEMORY};

/// Node CPU usage below this share of allocatable marks a scale-in candidate
pub const CPU_SCALE_IN_THRESHOLD_PERCENT: f64 = 30.0;

/// Node memory usage below this share of allocatable marks a scale-in candidate
pub const MEM_SCALE_IN_THRESHOLD_PERCENT: f64 = 30.0;

const READY_CONDITION: &str = "Ready";
const CONDITION_TRUE: &str = "True";

/// Build one stat per node, in input order
///
/// Requested totals include every pod scheduled to the node, DaemonSet pods
/// included. Nodes missing from `usage` report zero usage.
pub fn node_stats(nodes: &[Node], usage: &NodeUsage, pods: &[Pod]) -> Vec<NodeStat> {
    let stats: Vec<NodeStat> = nodes
        .iter()
        .map(|node| {
            let name = node.metadata.name.clone().unwrap_or_default();
            let allocatable = node.status.as_ref().and_then(|s| s.allocatable.as_ref());
            let cpu_alloc_milli = quantity::cpu_millis(quantity::resource(allocatable, CPU));
            let mem_alloc_mi = quantity::memory_mebibytes(quantity::resource(allocatable, MEMORY));

            let (cpu_used_milli, mem_used_mi) = usage
                .get(&name)
                .map(|u| {
                    (
                        quantity::cpu_millis(u.cpu.as_ref()),
                        quantity::memory_mebibytes(u.memory.as_ref()),
                    )
                })
                .unwrap_or((0, 0));

            let scheduled: Vec<&Pod> = pods
                .iter()
                .filter(|p| scheduled_node(p) == Some(name.as_str()))
                .collect();
            let (cpu_req_milli, mem_req_mi) = scheduled
                .iter()
                .map(|p| requested(p))
                .fold((0i64, 0i64), |(cpu, mem), (c, m)| {
                    (cpu.saturating_add(c), mem.saturating_add(m))
                });

            let status = classify(
                is_ready(node),
                cpu_used_milli,
                cpu_alloc_milli,
                mem_used_mi,
                mem_alloc_mi,
            );

            NodeStat {
                name,
                cpu_alloc_milli,
                cpu_req_milli,
                cpu_used_milli,
                mem_alloc_mi,
                mem_req_mi,
                mem_used_mi,
                pod_count: scheduled.len(),
                status,
            }
        })
        .collect();

    debug!(nodes = stats.len(), "Computed node stats");
    stats
}

/// Whether the node reports a Ready condition with status True
pub fn is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == READY_CONDITION))
        .is_some_and(|c| c.status == CONDITION_TRUE)
}

/// Classify a node from readiness and usage against allocatable
///
/// NotReady overrides everything; otherwise a node under both scale-in
/// thresholds is a scale-in candidate.
pub fn classify(
    ready: bool,
    cpu_used_milli: i64,
    cpu_alloc_milli: i64,
    mem_used_mi: i64,
    mem_alloc_mi: i64,
) -> NodeHealth {
    if !ready {
        return NodeHealth::NotReady;
    }

    let cpu_percent = usage_percent(cpu_used_milli, cpu_alloc_milli);
    let mem_percent = usage_percent(mem_used_mi, mem_alloc_mi);

    if cpu_percent < CPU_SCALE_IN_THRESHOLD_PERCENT && mem_percent < MEM_SCALE_IN_THRESHOLD_PERCENT {
        NodeHealth::ScaleInCandidate
    } else {
        NodeHealth::Healthy
    }
}

/// Usage as a percentage of allocatable; 0 when nothing is allocatable
fn usage_percent(used: i64, allocatable: i64) -> f64 {
    if allocatable > 0 {
        used as f64 / allocatable as f64 * 100.0
    } else {
        0.0
    }
}

fn scheduled_node(pod: &Pod) -> Option<&str> {
    pod.spec
        .as_ref()
        .and_then(|s| s.node_name.as_deref())
        .filter(|n| !n.is_empty())
}
