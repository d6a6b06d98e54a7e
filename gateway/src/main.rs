use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ligue1_gateway::{config::GatewayConfig, init_tracing, run};
use tracing::info;

/// Ligue 1 Vote Gateway
///
/// Serves the vote API over a local ledger and mirrors accepted votes.
#[derive(Parser, Debug)]
#[command(name = "ligue1-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Listen host (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Mirror journal file (overrides MIRROR_JOURNAL)
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Disable the /sandbox account and transaction routes
    #[arg(long)]
    no_sandbox_rpc: bool,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = GatewayConfig::load().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(journal) = cli.journal {
        config.mirror_journal = Some(journal);
    }
    if cli.no_sandbox_rpc {
        config.sandbox_rpc = false;
    }

    info!(?config, "Starting gateway");
    run(config).await.context("gateway stopped with an error")
}
