//! Recommendation rules over node stats and pod records

use tracing::debug;

use super::deployments::waste_percent;
use crate::models::{NodeHealth, NodeStat, PodRecord, Recommendation, RecommendationKind, Severity};

/// Default pod waste percentage at which recommendations fire
pub const DEFAULT_WASTE_THRESHOLD: f64 = 80.0;

/// Bucket a pod waste percentage into a severity
pub fn severity_for_waste(waste: f64) -> Severity {
    match waste {
        w if w >= 90.0 => Severity::High,
        w if w >= 70.0 => Severity::Medium,
        w if w >= 50.0 => Severity::Low,
        _ => Severity::Info,
    }
}

/// One recommendation per scale-in candidate or NotReady node
pub fn recommend_nodes(nodes: &[NodeStat]) -> Vec<Recommendation> {
    nodes
        .iter()
        .filter_map(|n| match n.status {
            NodeHealth::ScaleInCandidate => Some(Recommendation {
                kind: RecommendationKind::ScaleInCandidate,
                subject: n.name.clone(),
                suggestion: "Consider draining this node".to_string(),
                severity: Severity::Medium,
            }),
            NodeHealth::NotReady => Some(Recommendation {
                kind: RecommendationKind::Node,
                subject: format!("{} is NotReady", n.name),
                suggestion: "Check node health and connectivity".to_string(),
                severity: Severity::High,
            }),
            NodeHealth::Healthy => None,
        })
        .collect()
}

/// Up to two recommendations per pod whose waste reaches `threshold`
///
/// CPU and memory are evaluated independently; a resource with no request
/// never produces a recommendation.
pub fn recommend_pods(pods: &[PodRecord], threshold: f64) -> Vec<Recommendation> {
    pods.iter()
        .flat_map(|p| {
            let subject = format!("{}/{}", p.namespace, p.name);
            let cpu = waste_percent(p.cpu_req_milli, p.cpu_used_milli)
                .filter(|waste| *waste >= threshold)
                .map(|waste| Recommendation {
                    kind: RecommendationKind::PodCpu,
                    subject: subject.clone(),
                    suggestion: "Consider reducing CPU requests".to_string(),
                    severity: severity_for_waste(waste),
                });
            let mem = waste_percent(p.mem_req_mi, p.mem_used_mi)
                .filter(|waste| *waste >= threshold)
                .map(|waste| Recommendation {
                    kind: RecommendationKind::PodMemory,
                    subject,
                    suggestion: "Consider reducing Memory requests".to_string(),
                    severity: severity_for_waste(waste),
                });
            cpu.into_iter().chain(mem)
        })
        .collect()
}

/// Node recommendations followed by pod recommendations
pub fn recommend(nodes: &[NodeStat], pods: &[PodRecord], threshold: f64) -> Vec<Recommendation> {
    let mut recs = recommend_nodes(nodes);
    recs.extend(recommend_pods(pods, threshold));

    debug!(recommendations = recs.len(), threshold, "Generated recommendations");
    recs
}
