//! Node utilization view

use anyhow::Result;
use kcap_lib::analysis::node_stats;
use kcap_lib::NodeStat;
use tabled::Tabled;

use crate::client::{collect_snapshot, ClusterSource, SnapshotScope, DEFAULT_DEADLINE};
use crate::output::{color_node_health, format_triplet, print_json, print_table, OutputFormat};
use crate::settings::Settings;

/// Row for nodes table
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "NODE")]
    name: String,
    #[tabled(rename = "CPU(Alloc/Req/Use m)")]
    cpu: String,
    #[tabled(rename = "MEM(Alloc/Req/Use Mi)")]
    memory: String,
    #[tabled(rename = "PODS")]
    pods: usize,
    #[tabled(rename = "STATUS")]
    status: String,
}

impl From<&NodeStat> for NodeRow {
    fn from(n: &NodeStat) -> Self {
        Self {
            name: n.name.clone(),
            cpu: format_triplet(n.cpu_alloc_milli, n.cpu_req_milli, n.cpu_used_milli),
            memory: format_triplet(n.mem_alloc_mi, n.mem_req_mi, n.mem_used_mi),
            pods: n.pod_count,
            status: color_node_health(n.status),
        }
    }
}

/// Order nodes by name for display
pub fn sort_by_name(nodes: &mut [NodeStat]) {
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Show per-node allocatable, requested and used resources
pub async fn show_nodes(source: &dyn ClusterSource, settings: &Settings) -> Result<()> {
    let snapshot = collect_snapshot(
        source,
        settings.namespace.as_deref(),
        SnapshotScope::NODES,
        DEFAULT_DEADLINE,
    )
    .await?;

    let mut nodes = node_stats(&snapshot.nodes, &snapshot.node_usage, &snapshot.pods);
    sort_by_name(&mut nodes);

    match settings.format {
        OutputFormat::Json => print_json(&nodes)?,
        OutputFormat::Table => {
            let rows: Vec<NodeRow> = nodes.iter().map(NodeRow::from).collect();
            print_table(&rows, "No nodes found");
        }
    }

    Ok(())
}
