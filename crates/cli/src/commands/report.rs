//! Full cluster report

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use kcap_lib::{analyze, Analysis, ClusterSummary, DeploymentStat, NodeStat, Recommendation};
use serde::Serialize;

use super::deploys::{sort_by_cpu_waste, DeploymentRow};
use super::nodes::sort_by_name;
use super::recommend::RecommendationRow;
use crate::client::{collect_snapshot, ClusterSource, SnapshotScope, REPORT_DEADLINE};
use crate::output::{print_heading, print_json, print_table, OutputFormat};
use crate::settings::Settings;

/// Everything the report shows, as one document
#[derive(Debug, Serialize)]
pub struct ClusterReport {
    pub generated_at: DateTime<Utc>,
    /// `None` when all namespaces were analyzed
    pub namespace: Option<String>,
    pub threshold: f64,
    pub summary: ClusterSummary,
    pub nodes: Vec<NodeStat>,
    pub deployments: Vec<DeploymentStat>,
    pub recommendations: Vec<Recommendation>,
}

impl ClusterReport {
    /// Assemble a report from an analysis, applying display order
    pub fn new(analysis: Analysis, settings: &Settings, generated_at: DateTime<Utc>) -> Self {
        let Analysis {
            mut nodes,
            mut deployments,
            recommendations,
            summary,
            ..
        } = analysis;
        sort_by_name(&mut nodes);
        sort_by_cpu_waste(&mut deployments);

        Self {
            generated_at,
            namespace: settings.namespace.clone(),
            threshold: settings.threshold,
            summary,
            nodes,
            deployments,
            recommendations,
        }
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
fn percent_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn summary_lines(summary: &ClusterSummary) -> Vec<String> {
    vec![
        format!("Nodes:          {}", summary.node_count),
        format!(
            "CPU (m):        alloc {}  req {} ({:.1}%)  used {} ({:.1}%)",
            summary.cpu_alloc_milli,
            summary.cpu_req_milli,
            percent_of(summary.cpu_req_milli, summary.cpu_alloc_milli),
            summary.cpu_used_milli,
            percent_of(summary.cpu_used_milli, summary.cpu_alloc_milli),
        ),
        format!(
            "Memory (Mi):    alloc {}  req {} ({:.1}%)  used {} ({:.1}%)",
            summary.mem_alloc_mi,
            summary.mem_req_mi,
            percent_of(summary.mem_req_mi, summary.mem_alloc_mi),
            summary.mem_used_mi,
            percent_of(summary.mem_used_mi, summary.mem_alloc_mi),
        ),
    ]
}

fn print_report(report: &ClusterReport) {
    print_heading("Cluster Summary");
    println!("{}", "=".repeat(50));
    let scope = report.namespace.as_deref().unwrap_or("all namespaces");
    println!("Scope:          {}", scope.cyan());
    for line in summary_lines(&report.summary) {
        println!("{}", line);
    }
    println!(
        "Generated:      {}",
        report
            .generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .dimmed()
    );
    println!();

    print_heading("Top Over-provisioned Deployments");
    let rows: Vec<DeploymentRow> = report.deployments.iter().map(DeploymentRow::from).collect();
    print_table(&rows, "No deployments found");
    println!();

    print_heading(&format!("Recommendations (threshold {:.1}%)", report.threshold));
    let rows: Vec<RecommendationRow> = report
        .recommendations
        .iter()
        .map(RecommendationRow::from)
        .collect();
    print_table(&rows, "No recommendations");
}

/// Show cluster totals, deployments and recommendations together
pub async fn show_report(source: &dyn ClusterSource, settings: &Settings) -> Result<()> {
    let snapshot = collect_snapshot(
        source,
        settings.namespace.as_deref(),
        SnapshotScope::FULL,
        REPORT_DEADLINE,
    )
    .await?;

    let analysis = analyze(&snapshot, settings.threshold);
    let report = ClusterReport::new(analysis, settings, Utc::now());

    match settings.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}
