use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use market_data_ingestor::providers::alpaca_rest::AlpacaProvider;
use momentum_scanner::{
    config::ScannerConfig,
    delivery::{CommandDelivery, ReportDelivery},
    run::run_once,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Snapshot momentum scanner")]
struct Cli {
    /// TOML config file; built-in defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Symbol list, one per line
    #[arg(long, value_name = "FILE")]
    list: Option<PathBuf>,

    /// Observation cache file
    #[arg(long, value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Report output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the configured report delivery
    #[arg(long)]
    no_deliver: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut ScannerConfig) {
        if let Some(list) = &self.list {
            cfg.symbol_list = list.clone();
        }
        if let Some(cache) = &self.cache {
            cfg.cache_path = cache.clone();
        }
        if let Some(output) = &self.output {
            cfg.report_path = output.clone();
        }
        if self.no_deliver {
            cfg.delivery = None;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => ScannerConfig::load(path)?,
        None => ScannerConfig::default(),
    };
    cli.apply(&mut cfg);

    // Credentials are checked before anything touches the network.
    let provider = AlpacaProvider::from_env(cfg.provider.options())
        .context("APCA_API_KEY_ID and APCA_API_SECRET_KEY must be set")?;
    let delivery: Option<CommandDelivery> = cfg.delivery.clone();

    let summary = run_once(
        &cfg,
        &provider,
        Utc::now(),
        delivery.as_ref().map(|d| d as &dyn ReportDelivery),
    )
    .await?;

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        delivered = summary.delivered,
        "run complete"
    );
    Ok(())
}
