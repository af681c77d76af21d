//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use kcap_lib::{NodeHealth, Severity};
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print rows as a table, or a warning when there are none
pub fn print_table<T: Tabled>(rows: &[T], empty_message: &str) {
    if rows.is_empty() {
        print_warning(empty_message);
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
}

/// Print a warning message
///
/// Goes to stderr so JSON output stays parseable.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Format two figures as `a / b`
pub fn format_pair(first: i64, second: i64) -> String {
    format!("{} / {}", first, second)
}

/// Format three figures as `a / b / c`
pub fn format_triplet(first: i64, second: i64, third: i64) -> String {
    format!("{} / {} / {}", first, second, third)
}

/// Format a waste percentage with one decimal
pub fn format_waste(waste: f64) -> String {
    format!("{:.1}", waste)
}

/// Format an optional waste percentage, `N/A` when undefined
pub fn format_optional_waste(waste: Option<f64>) -> String {
    waste.map(format_waste).unwrap_or_else(|| "N/A".to_string())
}

/// Color node status
pub fn color_node_health(status: NodeHealth) -> String {
    let text = status.to_string();
    match status {
        NodeHealth::Healthy => text.green().to_string(),
        NodeHealth::ScaleInCandidate => text.yellow().to_string(),
        NodeHealth::NotReady => text.red().to_string(),
    }
}

/// Color recommendation severity
pub fn color_severity(severity: Severity) -> String {
    let text = severity.to_string();
    match severity {
        Severity::High => text.red().bold().to_string(),
        Severity::Medium => text.yellow().to_string(),
        Severity::Low => text.blue().to_string(),
        Severity::Info => text.dimmed().to_string(),
    }
}
