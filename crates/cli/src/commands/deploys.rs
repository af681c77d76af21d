//! Workload-level request versus usage

use anyhow::Result;
use kcap_lib::analysis::{aggregate_deployments, pod_records};
use kcap_lib::DeploymentStat;
use tabled::Tabled;

use crate::client::{collect_snapshot, ClusterSource, SnapshotScope, DEFAULT_DEADLINE};
use crate::output::{format_pair, format_waste, print_json, print_table, OutputFormat};
use crate::settings::Settings;

/// Row for deployments table
#[derive(Tabled)]
pub(crate) struct DeploymentRow {
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "DEPLOYMENT")]
    name: String,
    #[tabled(rename = "CPU(Req/Use m)")]
    cpu: String,
    #[tabled(rename = "MEM(Req/Use Mi)")]
    memory: String,
    #[tabled(rename = "PODS")]
    pods: usize,
    #[tabled(rename = "WASTE% CPU")]
    waste_cpu: String,
    #[tabled(rename = "WASTE% MEM")]
    waste_mem: String,
}

impl From<&DeploymentStat> for DeploymentRow {
    fn from(d: &DeploymentStat) -> Self {
        Self {
            namespace: d.namespace.clone(),
            name: d.name.clone(),
            cpu: format_pair(d.cpu_req_milli, d.cpu_used_milli),
            memory: format_pair(d.mem_req_mi, d.mem_used_mi),
            pods: d.pod_count,
            waste_cpu: format_waste(d.waste_cpu),
            waste_mem: format_waste(d.waste_mem),
        }
    }
}

/// Order deployments by CPU waste, most wasteful first
///
/// Ties keep their first-seen order.
pub fn sort_by_cpu_waste(deployments: &mut [DeploymentStat]) {
    deployments.sort_by(|a, b| b.waste_cpu.total_cmp(&a.waste_cpu));
}

/// Show requests and usage aggregated per workload
pub async fn show_deploys(source: &dyn ClusterSource, settings: &Settings) -> Result<()> {
    let snapshot = collect_snapshot(
        source,
        settings.namespace.as_deref(),
        SnapshotScope::PODS,
        DEFAULT_DEADLINE,
    )
    .await?;

    let pods = pod_records(&snapshot.pods, &snapshot.pod_usage);
    let mut deployments = aggregate_deployments(&pods);
    sort_by_cpu_waste(&mut deployments);

    match settings.format {
        OutputFormat::Json => print_json(&deployments)?,
        OutputFormat::Table => {
            let rows: Vec<DeploymentRow> = deployments.iter().map(DeploymentRow::from).collect();
            print_table(&rows, "No deployments found");
        }
    }

    Ok(())
}
