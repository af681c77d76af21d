//! Cluster access for inventory and metrics
//!
//! Nodes and pods come from the core/v1 API; usage comes from the
//! metrics.k8s.io API served by metrics-server. Metrics are optional: when
//! they cannot be fetched the snapshot carries empty usage maps.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kcap_lib::{ClusterSnapshot, NodeUsage, PodUsage, ResourceUsage};
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::GroupVersionKind;
use kube::{Client, Config};
use tracing::{debug, warn};

use crate::output::print_warning;

const METRICS_GROUP: &str = "metrics.k8s.io";
const METRICS_VERSION: &str = "v1beta1";

/// Deadline for collecting a snapshot for a single view
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Deadline for collecting the full report snapshot
pub const REPORT_DEADLINE: Duration = Duration::from_secs(60);

const METRICS_UNAVAILABLE: &str = "metrics-server not available, usage values will be zero";

/// Source of cluster inventory and usage metrics
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// List all nodes in the cluster
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// List pods in a namespace, or in all namespaces
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>>;

    /// Node usage keyed by node name
    async fn node_metrics(&self) -> Result<NodeUsage>;

    /// Per-container pod usage keyed by pod name
    async fn pod_metrics(&self, namespace: Option<&str>) -> Result<PodUsage>;
}

/// Kubernetes API client
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Create a client from a kubeconfig file, or infer the configuration
    pub async fn new(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                debug!(path = %path.display(), "Loading kubeconfig");
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .context("Invalid kubeconfig")?
            }
            None => {
                debug!("No kubeconfig found, inferring configuration");
                Config::infer()
                    .await
                    .context("Failed to infer Kubernetes configuration")?
            }
        };

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self { client })
    }

    fn metrics_api(&self, kind: &str, plural: &str, namespace: Option<&str>) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(METRICS_GROUP, METRICS_VERSION, kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, plural);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl ClusterSource for KubeClient {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let api: Api<Node> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;

        debug!(count = list.items.len(), "Listed nodes");
        Ok(list.items)
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>> {
        let api: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .context("Failed to list pods")?;

        debug!(count = list.items.len(), namespace = ?namespace, "Listed pods");
        Ok(list.items)
    }

    async fn node_metrics(&self) -> Result<NodeUsage> {
        let list = self
            .metrics_api("NodeMetrics", "nodes", None)
            .list(&ListParams::default())
            .await
            .context("Failed to list node metrics")?;

        Ok(parse_node_metrics(list.items))
    }

    async fn pod_metrics(&self, namespace: Option<&str>) -> Result<PodUsage> {
        let list = self
            .metrics_api("PodMetrics", "pods", namespace)
            .list(&ListParams::default())
            .await
            .context("Failed to list pod metrics")?;

        Ok(parse_pod_metrics(list.items))
    }
}

/// Extract node usage from NodeMetrics objects
pub fn parse_node_metrics(items: Vec<DynamicObject>) -> NodeUsage {
    let usage: NodeUsage = items
        .into_iter()
        .filter_map(|item| {
            let name = item.metadata.name.clone()?;
            let usage = item.data.get("usage").cloned()?;
            match serde_json::from_value::<ResourceUsage>(usage) {
                Ok(usage) => Some((name, usage)),
                Err(e) => {
                    warn!(node = %name, error = %e, "Skipping malformed node metrics");
                    None
                }
            }
        })
        .collect();

    debug!(count = usage.len(), "Parsed node metrics");
    usage
}

/// Extract per-container usage from PodMetrics objects
pub fn parse_pod_metrics(items: Vec<DynamicObject>) -> PodUsage {
    let usage: PodUsage = items
        .into_iter()
        .filter_map(|item| {
            let name = item.metadata.name.clone()?;
            let containers = item.data.get("containers")?.as_array()?;

            let usages = containers
                .iter()
                .filter_map(|c| {
                    let usage = c.get("usage").cloned()?;
                    serde_json::from_value::<ResourceUsage>(usage)
                        .map_err(|e| warn!(pod = %name, error = %e, "Skipping malformed container metrics"))
                        .ok()
                })
                .collect();
            Some((name, usages))
        })
        .collect();

    debug!(count = usage.len(), "Parsed pod metrics");
    usage
}

/// What a command needs fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotScope {
    pub nodes: bool,
    pub node_metrics: bool,
    pub pod_metrics: bool,
}

impl SnapshotScope {
    /// Nodes with usage, plus pods for requested totals
    pub const NODES: Self = Self {
        nodes: true,
        node_metrics: true,
        pod_metrics: false,
    };

    /// Pods with usage
    pub const PODS: Self = Self {
        nodes: false,
        node_metrics: false,
        pod_metrics: true,
    };

    /// Everything
    pub const FULL: Self = Self {
        nodes: true,
        node_metrics: true,
        pod_metrics: true,
    };
}

/// Collect a snapshot under an overall deadline
///
/// Pods are always listed. Listing failures are errors; metrics failures
/// degrade to empty usage maps.
pub async fn collect_snapshot(
    source: &dyn ClusterSource,
    namespace: Option<&str>,
    scope: SnapshotScope,
    deadline: Duration,
) -> Result<ClusterSnapshot> {
    match tokio::time::timeout(deadline, fetch(source, namespace, scope)).await {
        Ok(snapshot) => snapshot,
        Err(_) => bail!(
            "Timed out after {}s collecting cluster data",
            deadline.as_secs_f64()
        ),
    }
}

async fn fetch(
    source: &dyn ClusterSource,
    namespace: Option<&str>,
    scope: SnapshotScope,
) -> Result<ClusterSnapshot> {
    let nodes = if scope.nodes {
        source.list_nodes().await?
    } else {
        Vec::new()
    };

    let node_usage = if scope.node_metrics {
        metrics_or_empty(source.node_metrics().await, "node")
    } else {
        NodeUsage::new()
    };

    let pods = source.list_pods(namespace).await?;

    let pod_usage = if scope.pod_metrics {
        metrics_or_empty(source.pod_metrics(namespace).await, "pod")
    } else {
        PodUsage::new()
    };

    Ok(ClusterSnapshot {
        nodes,
        pods,
        node_usage,
        pod_usage,
    })
}

fn metrics_or_empty<T: Default>(result: Result<T>, kind: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), kind, "Metrics unavailable, using zero usage");
        print_warning(METRICS_UNAVAILABLE);
        T::default()
    })
}
