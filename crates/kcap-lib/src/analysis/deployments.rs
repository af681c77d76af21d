//! Deployment-level aggregation of pod records

use std::collections::HashMap;

use tracing::debug;

use crate::models::{DeploymentStat, PodRecord};

/// Grouping key of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentKey {
    pub namespace: String,
    pub name: String,
}

impl DeploymentKey {
    pub fn of(record: &PodRecord) -> Self {
        Self {
            namespace: record.namespace.clone(),
            name: record.deployment.clone(),
        }
    }
}

/// Waste percentage `100 * (1 - used / requested)`
///
/// `None` when nothing is requested. Negative values mean usage exceeds
/// the request.
pub fn waste_percent(requested: i64, used: i64) -> Option<f64> {
    (requested > 0).then(|| 100.0 * (1.0 - used as f64 / requested as f64))
}

/// Group pod records by (namespace, workload) and sum their figures
///
/// Groups are emitted in order of first appearance. Waste is reported as 0
/// for a resource with no requests.
pub fn aggregate_deployments(records: &[PodRecord]) -> Vec<DeploymentStat> {
    let mut index: HashMap<DeploymentKey, usize> = HashMap::new();
    let mut groups: Vec<DeploymentStat> = Vec::new();

    for record in records {
        let slot = *index.entry(DeploymentKey::of(record)).or_insert_with(|| {
            groups.push(DeploymentStat {
                namespace: record.namespace.clone(),
                name: record.deployment.clone(),
                cpu_req_milli: 0,
                cpu_used_milli: 0,
                mem_req_mi: 0,
                mem_used_mi: 0,
                pod_count: 0,
                waste_cpu: 0.0,
                waste_mem: 0.0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.pod_count += 1;
        group.cpu_req_milli = group.cpu_req_milli.saturating_add(record.cpu_req_milli);
        group.cpu_used_milli = group.cpu_used_milli.saturating_add(record.cpu_used_milli);
        group.mem_req_mi = group.mem_req_mi.saturating_add(record.mem_req_mi);
        group.mem_used_mi = group.mem_used_mi.saturating_add(record.mem_used_mi);
    }

    let stats: Vec<DeploymentStat> = groups
        .into_iter()
        .map(|d| DeploymentStat {
            waste_cpu: waste_percent(d.cpu_req_milli, d.cpu_used_milli).unwrap_or(0.0),
            waste_mem: waste_percent(d.mem_req_mi, d.mem_used_mi).unwrap_or(0.0),
            ..d
        })
        .collect();

    debug!(deployments = stats.len(), "Aggregated deployments");
    stats
}
