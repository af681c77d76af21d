//! Pod record building

use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

use super::ownership::resolve_ownership;
use crate::models::{PodRecord, PodUsage, ResourceUsage};
use crate::quantity::{self, CPU, MEMORY};

/// Build one record per non-DaemonSet pod, in input order
///
/// Pods missing from `usage` report zero usage.
pub fn pod_records(pods: &[Pod], usage: &PodUsage) -> Vec<PodRecord> {
    let records: Vec<PodRecord> = pods
        .iter()
        .filter_map(|pod| {
            let ownership = resolve_ownership(pod);
            if ownership.is_daemon_set {
                return None;
            }

            let name = pod.metadata.name.clone().unwrap_or_default();
            let (cpu_req_milli, mem_req_mi) = requested(pod);
            let (cpu_used_milli, mem_used_mi) = usage
                .get(&name)
                .map(|containers| summed_usage(containers))
                .unwrap_or((0, 0));

            Some(PodRecord {
                namespace: pod.metadata.namespace.clone().unwrap_or_default(),
                node_name: pod
                    .spec
                    .as_ref()
                    .and_then(|s| s.node_name.clone())
                    .unwrap_or_default(),
                name,
                cpu_req_milli,
                cpu_used_milli,
                mem_req_mi,
                mem_used_mi,
                owner: ownership.controller_kind,
                deployment: ownership.workload,
                is_daemon_set: false,
            })
        })
        .collect();

    debug!(
        pods = pods.len(),
        records = records.len(),
        "Built pod records"
    );
    records
}

/// Requested CPU (m) and memory (Mi) summed over the pod's containers
///
/// Limits are ignored. Memory is truncated to Mi per container. Totals
/// saturate at `i64::MAX`.
pub(crate) fn requested(pod: &Pod) -> (i64, i64) {
    let containers = pod.spec.as_ref().map(|s| s.containers.as_slice()).unwrap_or_default();

    containers.iter().fold((0i64, 0i64), |(cpu, mem), container| {
        let requests = container.resources.as_ref().and_then(|r| r.requests.as_ref());
        (
            cpu.saturating_add(quantity::cpu_millis(quantity::resource(requests, CPU))),
            mem.saturating_add(quantity::memory_mebibytes(quantity::resource(requests, MEMORY))),
        )
    })
}

/// Used CPU (m) and memory (Mi) summed over per-container usage
///
/// Memory is summed in bytes before truncating to Mi.
fn summed_usage(containers: &[ResourceUsage]) -> (i64, i64) {
    let (cpu, mem_bytes) = containers.iter().fold((0i64, 0i64), |(cpu, mem), usage| {
        (
            cpu.saturating_add(quantity::cpu_millis(usage.cpu.as_ref())),
            mem.saturating_add(quantity::memory_bytes(usage.memory.as_ref())),
        )
    });
    (cpu, quantity::bytes_to_mebibytes(mem_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{pod, PodFixture};

    #[test]
    fn test_requests_summed_across_containers() {
        let p = pod(PodFixture {
            containers: vec![("250m", "128Mi"), ("750m", "384Mi")],
            ..PodFixture::new("default", "api-0")
        });
        assert_eq!(requested(&p), (1000, 512));
    }

    #[test]
    fn test_huge_requests_saturate() {
        let p = pod(PodFixture {
            containers: vec![("5P", "1Mi"), ("5P", "1Mi")],
            ..PodFixture::new("default", "big-0")
        });

        let records = pod_records(&[p], &PodUsage::new());
        assert_eq!(records[0].cpu_req_milli, i64::MAX);
        assert_eq!(records[0].mem_req_mi, 2);
    }

    #[test]
    fn test_huge_usage_saturates() {
        let p = pod(PodFixture::new("default", "big-0"));
        let mut usage = PodUsage::new();
        usage.insert(
            "big-0".to_string(),
            vec![ResourceUsage::new("5P", "4Ei"), ResourceUsage::new("5P", "4Ei")],
        );

        let records = pod_records(&[p], &usage);
        assert_eq!(records[0].cpu_used_milli, i64::MAX);
        assert_eq!(records[0].mem_used_mi, i64::MAX / quantity::MEBIBYTE);
        assert!(records[0].mem_used_mi > 0);
    }

    #[test]
    fn test_missing_usage_is_zero() {
        let p = pod(PodFixture {
            containers: vec![("500m", "256Mi")],
            ..PodFixture::new("default", "api-0")
        });

        let records = pod_records(&[p], &PodUsage::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cpu_used_milli, 0);
        assert_eq!(records[0].mem_used_mi, 0);
        assert_eq!(records[0].cpu_req_milli, 500);
        assert_eq!(records[0].mem_req_mi, 256);
    }

    #[test]
    fn test_usage_summed_across_containers() {
        let p = pod(PodFixture::new("default", "api-0"));
        let mut usage = PodUsage::new();
        usage.insert(
            "api-0".to_string(),
            vec![
                ResourceUsage::new("120m", "524288"),
                ResourceUsage::new("30m", "524288"),
            ],
        );

        let records = pod_records(&[p], &usage);
        assert_eq!(records[0].cpu_used_milli, 150);
        // Two half-mebibyte containers make one full Mi
        assert_eq!(records[0].mem_used_mi, 1);
    }

    #[test]
    fn test_daemon_set_pods_dropped() {
        let pods = vec![
            pod(PodFixture {
                owners: vec![("DaemonSet", "kube-proxy")],
                ..PodFixture::new("kube-system", "kube-proxy-abcde")
            }),
            pod(PodFixture {
                owners: vec![("ReplicaSet", "web-7d9f8c9c8b")],
                ..PodFixture::new("default", "web-7d9f8c9c8b-xyz12")
            }),
        ];

        let records = pod_records(&pods, &PodUsage::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "web-7d9f8c9c8b-xyz12");
        assert_eq!(records[0].deployment, "web");
        assert_eq!(records[0].owner, "ReplicaSet");
        assert!(!records[0].is_daemon_set);
    }

    #[test]
    fn test_input_order_and_node_name_preserved() {
        let pods = vec![
            pod(PodFixture {
                node: Some("node-b"),
                ..PodFixture::new("default", "zeta")
            }),
            pod(PodFixture::new("default", "alpha")),
        ];

        let records = pod_records(&pods, &PodUsage::new());
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(records[0].node_name, "node-b");
        assert_eq!(records[1].node_name, "");
        assert_eq!(records[1].owner, "None");
        assert_eq!(records[1].deployment, "alpha");
    }
}
