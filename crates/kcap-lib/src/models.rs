//! Core data models for capacity analysis

use std::collections::HashMap;
use std::fmt;

use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};

/// Raw CPU/memory usage as reported by the metrics API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    #[serde(default)]
    pub cpu: Option<Quantity>,
    #[serde(default)]
    pub memory: Option<Quantity>,
}

impl ResourceUsage {
    pub fn new(cpu: &str, memory: &str) -> Self {
        Self {
            cpu: Some(Quantity(cpu.to_string())),
            memory: Some(Quantity(memory.to_string())),
        }
    }
}

/// Node usage keyed by node name
pub type NodeUsage = HashMap<String, ResourceUsage>;

/// Per-container pod usage keyed by pod name
pub type PodUsage = HashMap<String, Vec<ResourceUsage>>;

/// Point-in-time inventory and metrics handed over for analysis
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    pub nodes: Vec<Node>,
    pub pods: Vec<Pod>,
    pub node_usage: NodeUsage,
    pub pod_usage: PodUsage,
}

/// Health/utilization classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeHealth {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Scale-in candidate")]
    ScaleInCandidate,
    #[serde(rename = "NotReady")]
    NotReady,
}

impl fmt::Display for NodeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeHealth::Healthy => write!(f, "Healthy"),
            NodeHealth::ScaleInCandidate => write!(f, "Scale-in candidate"),
            NodeHealth::NotReady => write!(f, "NotReady"),
        }
    }
}

/// Recommendation urgency, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// What a recommendation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationKind {
    #[serde(rename = "Scale-in candidate")]
    ScaleInCandidate,
    #[serde(rename = "Node")]
    Node,
    #[serde(rename = "Pod (CPU)")]
    PodCpu,
    #[serde(rename = "Pod (Memory)")]
    PodMemory,
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationKind::ScaleInCandidate => write!(f, "Scale-in candidate"),
            RecommendationKind::Node => write!(f, "Node"),
            RecommendationKind::PodCpu => write!(f, "Pod (CPU)"),
            RecommendationKind::PodMemory => write!(f, "Pod (Memory)"),
        }
    }
}

/// Per-node capacity, requests and usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStat {
    pub name: String,
    pub cpu_alloc_milli: i64,
    pub cpu_req_milli: i64,
    pub cpu_used_milli: i64,
    pub mem_alloc_mi: i64,
    pub mem_req_mi: i64,
    pub mem_used_mi: i64,
    /// Pods scheduled to this node, regardless of owner kind
    pub pod_count: usize,
    pub status: NodeHealth,
}

/// Normalized requests and usage of a single workload pod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodRecord {
    pub namespace: String,
    pub name: String,
    pub node_name: String,
    pub cpu_req_milli: i64,
    pub cpu_used_milli: i64,
    pub mem_req_mi: i64,
    pub mem_used_mi: i64,
    /// Kind of the first owner reference, or "None"
    pub owner: String,
    /// Resolved workload name used as the aggregation key
    pub deployment: String,
    pub is_daemon_set: bool,
}

/// Requests and usage summed over the pods of one workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStat {
    pub namespace: String,
    pub name: String,
    pub cpu_req_milli: i64,
    pub cpu_used_milli: i64,
    pub mem_req_mi: i64,
    pub mem_used_mi: i64,
    pub pod_count: usize,
    /// 0 when nothing is requested
    pub waste_cpu: f64,
    /// 0 when nothing is requested
    pub waste_mem: f64,
}

/// Advisory recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub subject: String,
    pub suggestion: String,
    pub severity: Severity,
}
