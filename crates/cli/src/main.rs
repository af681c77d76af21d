//! Kubernetes Capacity Analyzer CLI
//!
//! Reports allocatable, requested and used CPU/memory for nodes, pods and
//! deployments, and suggests where requests can be reduced or nodes drained.

mod client;
mod commands;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::KubeClient;
use commands::{deploys, nodes, pods, recommend, report};
use settings::{Config, Overrides, Settings};

/// Kubernetes Capacity Analyzer
#[derive(Parser)]
#[command(name = "kcap")]
#[command(author, version, about = "Kubernetes capacity and waste analyzer", long_about = None)]
pub struct Cli {
    /// Path to kubeconfig file (uses default if not specified)
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Namespace to analyze (all namespaces if not specified)
    #[arg(long, short, global = true)]
    pub namespace: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Node allocatable, requested and used CPU/memory
    Nodes,

    /// Pod CPU/memory requests versus usage
    Pods,

    /// Aggregated deployment requests versus usage
    Deploys,

    /// Recommendations for nodes and pods
    Recommend {
        /// Waste percentage at which pod recommendations fire [default: 80]
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Full cluster summary with deployments and recommendations
    Report {
        /// Waste percentage at which pod recommendations fire [default: 80]
        #[arg(long)]
        threshold: Option<f64>,
    },
}

impl Commands {
    fn threshold(&self) -> Option<f64> {
        match self {
            Commands::Recommend { threshold } | Commands::Report { threshold } => *threshold,
            _ => None,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = Overrides {
        kubeconfig: cli.kubeconfig.clone(),
        namespace: cli.namespace.clone(),
        format: cli.format,
        threshold: cli.command.threshold(),
    };
    let settings = Settings::resolve(overrides, Config::load()?)?;
    tracing::debug!(?settings, "Resolved settings");

    let client = KubeClient::new(settings.kubeconfig.as_deref()).await?;

    match cli.command {
        Commands::Nodes => nodes::show_nodes(&client, &settings).await?,
        Commands::Pods => pods::show_pods(&client, &settings).await?,
        Commands::Deploys => deploys::show_deploys(&client, &settings).await?,
        Commands::Recommend { .. } => recommend::show_recommendations(&client, &settings).await?,
        Commands::Report { .. } => report::show_report(&client, &settings).await?,
    }

    Ok(())
}
