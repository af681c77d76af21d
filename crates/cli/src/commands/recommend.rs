//! Node and pod recommendations

use anyhow::Result;
use kcap_lib::analysis::{node_stats, pod_records, recommend};
use kcap_lib::Recommendation;
use tabled::Tabled;

use crate::client::{collect_snapshot, ClusterSource, SnapshotScope, DEFAULT_DEADLINE};
use crate::output::{color_severity, print_json, print_table, OutputFormat};
use crate::settings::Settings;

/// Row for recommendations table
#[derive(Tabled)]
pub(crate) struct RecommendationRow {
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "DETAILS")]
    details: String,
    #[tabled(rename = "SUGGESTION")]
    suggestion: String,
    #[tabled(rename = "SEVERITY")]
    severity: String,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(r: &Recommendation) -> Self {
        Self {
            kind: r.kind.to_string(),
            details: r.subject.clone(),
            suggestion: r.suggestion.clone(),
            severity: color_severity(r.severity),
        }
    }
}

/// Show node recommendations followed by pod recommendations
pub async fn show_recommendations(source: &dyn ClusterSource, settings: &Settings) -> Result<()> {
    let snapshot = collect_snapshot(
        source,
        settings.namespace.as_deref(),
        SnapshotScope::FULL,
        DEFAULT_DEADLINE,
    )
    .await?;

    let nodes = node_stats(&snapshot.nodes, &snapshot.node_usage, &snapshot.pods);
    let pods = pod_records(&snapshot.pods, &snapshot.pod_usage);
    let recommendations = recommend(&nodes, &pods, settings.threshold);

    match settings.format {
        OutputFormat::Json => print_json(&recommendations)?,
        OutputFormat::Table => {
            let rows: Vec<RecommendationRow> =
                recommendations.iter().map(RecommendationRow::from).collect();
            print_table(&rows, "No recommendations");
        }
    }

    Ok(())
}
