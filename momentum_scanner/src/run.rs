//! One scanner run, from symbol list to delivered report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use market_data_ingestor::{
    models::request_params::SnapshotRequestParams,
    providers::{SnapshotProvider, alpaca_rest::SnapshotSet},
};
use tracing::{info, warn};

use crate::{
    cache::ObservationCache,
    config::ScannerConfig,
    delivery::ReportDelivery,
    engine::MetricEngine,
    errors::RunError,
    rank::rank_by_trades,
    report::{ReportContext, render_html, write_report},
    session::SessionTime,
    universe::load_universe,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Symbols that produced a row.
    pub processed: usize,
    pub skipped: usize,
    /// Written report, if any rows were produced.
    pub report_path: Option<PathBuf>,
    pub delivered: bool,
}

/// Runs the pipeline once.
///
/// The cache is saved only after the report has been written; a fetch, parse or
/// report failure returns before that point and leaves the stored cache as it was.
/// A run with no qualifying symbols writes nothing and still succeeds.
pub async fn run_once(
    config: &ScannerConfig,
    provider: &dyn SnapshotProvider,
    now: DateTime<Utc>,
    delivery: Option<&dyn ReportDelivery>,
) -> Result<RunSummary, RunError> {
    let universe = load_universe(&config.symbol_list)?;
    let mut cache = ObservationCache::load(&config.cache_path)?;

    let params = SnapshotRequestParams::new(
        universe.iter().map(|s| s.as_str().to_string()).collect(),
    )
    .with_feed(config.provider.feed);
    let payload = provider.fetch_snapshots(&params).await?;

    let session = SessionTime::from_utc(now);
    let snapshots = SnapshotSet::from_slice(&payload)?;

    let engine = MetricEngine::new(config.min_minute_trades);
    let mut output = engine.process(&universe, &snapshots, session.is_premarket, &mut cache);

    let mut summary = RunSummary {
        processed: output.results.len(),
        skipped: output.skipped,
        report_path: None,
        delivered: false,
    };
    if output.results.is_empty() {
        warn!(
            universe = universe.len(),
            skipped = output.skipped,
            "no valid stock data found"
        );
        return Ok(summary);
    }
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        premarket = session.is_premarket,
        "processed snapshots"
    );

    rank_by_trades(&mut output.results);

    let timestamp = session.timestamp();
    let html = render_html(
        &output.results,
        &ReportContext {
            timestamp: &timestamp,
            timezone: session.timezone_abbreviation(),
            highlight_trades: config.highlight_trades,
            refresh_secs: config.refresh_secs,
        },
    );
    write_report(&config.report_path, &html)?;
    summary.report_path = Some(config.report_path.clone());
    cache.save(&config.cache_path)?;

    if let Some(delivery) = delivery {
        match delivery.deliver(&config.report_path) {
            Ok(()) => summary.delivered = true,
            Err(e) => warn!("report delivery failed: {e}"),
        }
    }

    info!("updated {timestamp} {}", session.timezone_abbreviation());
    Ok(summary)
}
