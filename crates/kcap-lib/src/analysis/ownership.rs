//! Workload ownership resolution
//!
//! Derives the workload (deployment) name a pod is aggregated under from
//! its owner references and labels.
//!
//! Only the first Deployment or ReplicaSet reference in declaration order is
//! considered; a pod is never matched against the most authoritative owner.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

pub const KIND_DAEMON_SET: &str = "DaemonSet";
pub const KIND_DEPLOYMENT: &str = "Deployment";
pub const KIND_REPLICA_SET: &str = "ReplicaSet";

/// Displayed controller kind for pods without owner references
pub const NO_OWNER: &str = "None";

pub const LABEL_APP_NAME: &str = "app.kubernetes.io/name";
pub const LABEL_APP: &str = "app";

/// Resolved ownership of a pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Kind of the first owner reference, or [`NO_OWNER`]
    pub controller_kind: String,
    /// Workload name used as the aggregation key
    pub workload: String,
    pub is_daemon_set: bool,
}

/// Resolve the ownership of a pod from its metadata
pub fn resolve_ownership(pod: &Pod) -> Ownership {
    let owners = pod.metadata.owner_references.as_deref().unwrap_or_default();
    let pod_name = pod.metadata.name.as_deref().unwrap_or_default();

    Ownership {
        controller_kind: controller_kind(owners),
        workload: resolve_workload_name(owners, pod.metadata.labels.as_ref(), pod_name),
        is_daemon_set: is_daemon_set_owned(owners),
    }
}

/// Whether any owner reference is a DaemonSet
pub fn is_daemon_set_owned(owners: &[OwnerReference]) -> bool {
    owners.iter().any(|o| o.kind == KIND_DAEMON_SET)
}

/// Kind of the first owner reference
pub fn controller_kind(owners: &[OwnerReference]) -> String {
    owners
        .first()
        .map(|o| o.kind.clone())
        .unwrap_or_else(|| NO_OWNER.to_string())
}

/// Resolve the workload name of a pod
///
/// Resolution order, first match wins:
/// 1. first Deployment or ReplicaSet owner reference (ReplicaSet names lose
///    their generated `-<hash>` suffix)
/// 2. the `app.kubernetes.io/name` label
/// 3. the `app` label
/// 4. the pod name itself
pub fn resolve_workload_name(
    owners: &[OwnerReference],
    labels: Option<&BTreeMap<String, String>>,
    pod_name: &str,
) -> String {
    for owner in owners {
        match owner.kind.as_str() {
            KIND_DEPLOYMENT => return owner.name.clone(),
            KIND_REPLICA_SET => return strip_generated_suffix(&owner.name).to_string(),
            _ => {}
        }
    }

    labels
        .and_then(|l| l.get(LABEL_APP_NAME).or_else(|| l.get(LABEL_APP)))
        .cloned()
        .unwrap_or_else(|| pod_name.to_string())
}

/// Recover a deployment name from a generated ReplicaSet name
///
/// Truncates at the last hyphen; names without one (or starting with the
/// only one) are returned unchanged.
pub fn strip_generated_suffix(replica_set: &str) -> &str {
    match replica_set.rfind('-') {
        Some(idx) if idx > 0 => &replica_set[..idx],
        _ => replica_set,
    }
}
