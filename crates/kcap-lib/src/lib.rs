//! Capacity analysis library for Kubernetes clusters
//!
//! This crate provides the core functionality for:
//! - Normalizing resource quantities to milli-CPU and mebibytes
//! - Resolving the workload that owns a pod
//! - Per-node, per-pod and per-deployment utilization summaries
//! - Over/under-provisioning recommendations

pub mod analysis;
pub mod models;
pub mod quantity;

pub use analysis::{analyze, Analysis, ClusterSummary, DEFAULT_WASTE_THRESHOLD};
pub use models::*;
pub use quantity::QuantityError;
