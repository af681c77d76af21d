//! Pod requests versus usage

use anyhow::Result;
use kcap_lib::analysis::{pod_records, waste_percent};
use kcap_lib::PodRecord;
use tabled::Tabled;

use crate::client::{collect_snapshot, ClusterSource, SnapshotScope, DEFAULT_DEADLINE};
use crate::output::{format_optional_waste, format_pair, print_json, print_table, OutputFormat};
use crate::settings::Settings;

/// Row for pods table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "POD")]
    name: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "CPU(Req/Use m)")]
    cpu: String,
    #[tabled(rename = "MEM(Req/Use Mi)")]
    memory: String,
    #[tabled(rename = "OWNER")]
    owner: String,
    #[tabled(rename = "WORKLOAD")]
    workload: String,
    #[tabled(rename = "WASTE% CPU")]
    waste_cpu: String,
    #[tabled(rename = "WASTE% MEM")]
    waste_mem: String,
}

impl From<&PodRecord> for PodRow {
    fn from(p: &PodRecord) -> Self {
        Self {
            namespace: p.namespace.clone(),
            name: p.name.clone(),
            node: p.node_name.clone(),
            cpu: format_pair(p.cpu_req_milli, p.cpu_used_milli),
            memory: format_pair(p.mem_req_mi, p.mem_used_mi),
            owner: p.owner.clone(),
            workload: p.deployment.clone(),
            waste_cpu: format_optional_waste(waste_percent(p.cpu_req_milli, p.cpu_used_milli)),
            waste_mem: format_optional_waste(waste_percent(p.mem_req_mi, p.mem_used_mi)),
        }
    }
}

/// Show requested versus used resources per pod
pub async fn show_pods(source: &dyn ClusterSource, settings: &Settings) -> Result<()> {
    let snapshot = collect_snapshot(
        source,
        settings.namespace.as_deref(),
        SnapshotScope::PODS,
        DEFAULT_DEADLINE,
    )
    .await?;

    let pods = pod_records(&snapshot.pods, &snapshot.pod_usage);

    match settings.format {
        OutputFormat::Json => print_json(&pods)?,
        OutputFormat::Table => {
            let rows: Vec<PodRow> = pods.iter().map(PodRow::from).collect();
            print_table(&rows, "No pods found");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cpu_req: i64, cpu_used: i64) -> PodRecord {
        PodRecord {
            namespace: "default".to_string(),
            name: "web-7d9f8c9c8b-aaaaa".to_string(),
            node_name: "node-a".to_string(),
            cpu_req_milli: cpu_req,
            cpu_used_milli: cpu_used,
            mem_req_mi: 0,
            mem_used_mi: 12,
            owner: "ReplicaSet".to_string(),
            deployment: "web".to_string(),
            is_daemon_set: false,
        }
    }

    #[test]
    fn test_pod_row_waste() {
        let row = PodRow::from(&record(1000, 100));
        assert_eq!(row.cpu, "1000 / 100");
        assert_eq!(row.waste_cpu, "90.0");
        assert_eq!(row.waste_mem, "N/A");
        assert_eq!(row.workload, "web");
    }

    #[test]
    fn test_pod_row_under_provisioned() {
        let row = PodRow::from(&record(100, 150));
        assert_eq!(row.waste_cpu, "-50.0");
    }
}
