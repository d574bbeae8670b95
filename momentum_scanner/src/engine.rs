//! Metric engine: one snapshot in, one result row (or a skip) out.
//!
//! For each symbol, checks run in a fixed order and the first failure skips the
//! symbol:
//! 1. the minute bar must carry a trade count of at least `min_minute_trades`;
//! 2. the latest trade (price and time), the current-day close and the minute
//!    volume must be present;
//! 3. the reference price is the current-day close in pre-market, otherwise the
//!    previous-day close, which must then be present.
//!
//! Deltas are taken against the cache entry from the previous run (zero when there
//! is none), and only then is the entry overwritten with this run's values.

use std::fmt;

use market_data_ingestor::{models::snapshot::Snapshot, providers::alpaca_rest::SnapshotSet};
use serde::Serialize;
use tracing::debug;

use crate::{
    cache::{ObservationCache, ObservationEntry},
    universe::Symbol,
};

/// Minute bars with fewer trades than this are too illiquid to report.
pub const DEFAULT_MIN_MINUTE_TRADES: i64 = 50;

/// One reported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub symbol: Symbol,
    /// Latest trade price.
    pub price: f64,
    /// Current-day bar close.
    pub day_close: f64,
    /// Percent change of `price` against the reference price.
    pub percent: f64,
    /// `percent / 2`.
    pub gradient_full: f64,
    /// Percent deviation of `price` from `day_close`.
    pub gradient_recent: f64,
    pub gradient_change: f64,
    /// Current minute-bar volume.
    pub volume: i64,
    pub volume_change: i64,
    /// Current minute-bar trade count.
    pub trades: i64,
    pub trades_change: i64,
}

/// Why a symbol produced no row. Never fatal to the run.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The symbol is absent from the response (or `null`).
    NotInResponse,
    /// The symbol's record has the wrong shape.
    Malformed(String),
    MissingMinuteBar,
    LowActivity { trades: i64 },
    MissingLatestTrade,
    MissingDailyClose,
    MissingMinuteVolume,
    MissingPrevDailyClose,
    /// A price that would be divided by is zero, negative or not finite.
    InvalidPrice { field: &'static str, value: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotInResponse => write!(f, "not in response"),
            SkipReason::Malformed(e) => write!(f, "malformed snapshot: {e}"),
            SkipReason::MissingMinuteBar => write!(f, "no minute bar trade count"),
            SkipReason::LowActivity { trades } => write!(f, "only {trades} minute trades"),
            SkipReason::MissingLatestTrade => write!(f, "no latest trade"),
            SkipReason::MissingDailyClose => write!(f, "no daily bar close"),
            SkipReason::MissingMinuteVolume => write!(f, "no minute bar volume"),
            SkipReason::MissingPrevDailyClose => write!(f, "no previous daily bar close"),
            SkipReason::InvalidPrice { field, value } => write!(f, "invalid {field} {value}"),
        }
    }
}

/// Rows plus a count of the symbols that were skipped.
#[derive(Debug, Default)]
pub struct EngineOutput {
    pub results: Vec<MetricResult>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricEngine {
    min_minute_trades: i64,
}

impl Default for MetricEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MINUTE_TRADES)
    }
}

impl MetricEngine {
    pub fn new(min_minute_trades: i64) -> Self {
        Self { min_minute_trades }
    }

    /// Computes one symbol's row and, on success only, records this run's
    /// observation in `cache`.
    pub fn compute(
        &self,
        symbol: &Symbol,
        snapshot: &Snapshot,
        is_premarket: bool,
        cache: &mut ObservationCache,
    ) -> Result<MetricResult, SkipReason> {
        let minute_bar = snapshot.minute_bar.as_ref();
        let trades = minute_bar
            .and_then(|b| b.trade_count)
            .ok_or(SkipReason::MissingMinuteBar)?;
        if trades < self.min_minute_trades {
            return Err(SkipReason::LowActivity { trades });
        }

        let (price, _traded_at) = snapshot
            .latest_trade
            .as_ref()
            .and_then(|t| Some((t.price?, t.timestamp?)))
            .ok_or(SkipReason::MissingLatestTrade)?;
        let day_close = snapshot
            .daily_bar
            .as_ref()
            .and_then(|b| b.close)
            .ok_or(SkipReason::MissingDailyClose)?;
        let volume = minute_bar
            .and_then(|b| b.volume)
            .ok_or(SkipReason::MissingMinuteVolume)?;

        let reference_price = if is_premarket {
            day_close
        } else {
            snapshot
                .prev_daily_bar
                .as_ref()
                .and_then(|b| b.close)
                .ok_or(SkipReason::MissingPrevDailyClose)?
        };

        check_finite("price", price)?;
        check_positive("day_close", day_close)?;
        check_positive("reference_price", reference_price)?;

        let percent = (price - reference_price) / reference_price * 100.0;
        let gradient_recent = (price - day_close) / day_close * 100.0;
        check_finite("percent", percent)?;
        check_finite("gradient_recent", gradient_recent)?;

        let previous = cache.get(symbol.as_str()).copied().unwrap_or_default();
        let gradient_change = gradient_recent - previous.recent_gradient;
        check_finite("gradient_change", gradient_change)?;
        let result = MetricResult {
            symbol: symbol.clone(),
            price,
            day_close,
            percent,
            gradient_full: percent / 2.0,
            gradient_recent,
            gradient_change,
            volume,
            volume_change: volume.saturating_sub(previous.volume),
            trades,
            trades_change: trades.saturating_sub(previous.trades),
        };

        cache.put(
            symbol.clone(),
            ObservationEntry {
                recent_gradient: gradient_recent,
                volume,
                trades,
            },
        );
        Ok(result)
    }

    /// Runs [`compute`](Self::compute) over `universe` in order.
    pub fn process(
        &self,
        universe: &[Symbol],
        snapshots: &SnapshotSet,
        is_premarket: bool,
        cache: &mut ObservationCache,
    ) -> EngineOutput {
        let mut out = EngineOutput {
            results: Vec::with_capacity(universe.len()),
            skipped: 0,
        };

        for symbol in universe {
            let outcome = match snapshots.get(symbol.as_str()) {
                None => Err(SkipReason::NotInResponse),
                Some(Err(e)) => Err(SkipReason::Malformed(e.to_string())),
                Some(Ok(snapshot)) => self.compute(symbol, &snapshot, is_premarket, cache),
            };
            match outcome {
                Ok(row) => out.results.push(row),
                Err(reason) => {
                    debug!(%symbol, %reason, "skipping symbol");
                    out.skipped += 1;
                }
            }
        }
        out
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), SkipReason> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SkipReason::InvalidPrice { field, value })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), SkipReason> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SkipReason::InvalidPrice { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_data_ingestor::models::snapshot::{SnapshotBar, Trade};

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn snapshot(
        price: f64,
        day_close: f64,
        prev_close: Option<f64>,
        volume: i64,
        trades: i64,
    ) -> Snapshot {
        Snapshot {
            latest_trade: Some(Trade {
                timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap()),
                price: Some(price),
            }),
            minute_bar: Some(SnapshotBar {
                close: Some(price),
                volume: Some(volume),
                trade_count: Some(trades),
            }),
            daily_bar: Some(SnapshotBar {
                close: Some(day_close),
                ..Default::default()
            }),
            prev_daily_bar: prev_close.map(|c| SnapshotBar {
                close: Some(c),
                ..Default::default()
            }),
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn premarket_uses_day_close() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        let snap = snapshot(101.0, 100.0, Some(50.0), 1_000, 60);

        let r = engine.compute(&sym("AAPL"), &snap, true, &mut cache).unwrap();
        assert_close(r.percent, 1.0);
        assert_close(r.gradient_full, 0.5);
        assert_close(r.gradient_recent, 1.0);
        assert_eq!(r.price, 101.0);
        assert_eq!(r.day_close, 100.0);
    }

    #[test]
    fn regular_session_uses_previous_close() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        let snap = snapshot(110.0, 100.0, Some(100.0 / 1.1), 1_000, 60);

        let r = engine.compute(&sym("AAPL"), &snap, false, &mut cache).unwrap();
        assert_close(r.percent, 21.0);
        assert_close(r.gradient_full, 10.5);
        assert_close(r.gradient_recent, 10.0);
    }

    #[test]
    fn first_sighting_reports_zero_baseline() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        let snap = snapshot(99.0, 100.0, Some(98.0), 4_321, 77);

        let r = engine.compute(&sym("MSFT"), &snap, false, &mut cache).unwrap();
        assert_eq!(r.gradient_change, r.gradient_recent);
        assert_eq!(r.volume_change, 4_321);
        assert_eq!(r.trades_change, 77);
    }

    #[test]
    fn deltas_use_pre_update_entry_then_overwrite() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        let prior = ObservationEntry {
            recent_gradient: 0.25,
            volume: 1_000,
            trades: 90,
        };
        cache.put(sym("MSFT"), prior);

        let snap = snapshot(102.0, 100.0, Some(100.0), 1_500, 70);
        let r = engine.compute(&sym("MSFT"), &snap, false, &mut cache).unwrap();
        assert_eq!(r.gradient_change, r.gradient_recent - prior.recent_gradient);
        assert_eq!(r.volume_change, 500);
        assert_eq!(r.trades_change, -20);

        assert_eq!(
            cache.get("MSFT"),
            Some(&ObservationEntry {
                recent_gradient: r.gradient_recent,
                volume: 1_500,
                trades: 70,
            })
        );
    }

    #[test]
    fn minute_trade_threshold_is_inclusive() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();

        let low = snapshot(101.0, 100.0, Some(100.0), 500, 49);
        assert_eq!(
            engine.compute(&sym("LOW"), &low, false, &mut cache),
            Err(SkipReason::LowActivity { trades: 49 })
        );
        assert!(cache.get("LOW").is_none());

        let ok = snapshot(101.0, 100.0, Some(100.0), 500, 50);
        assert!(engine.compute(&sym("OK"), &ok, false, &mut cache).is_ok());
    }

    #[test]
    fn missing_prev_close_skips_outside_premarket_only() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        let snap = snapshot(101.0, 100.0, None, 500, 60);

        assert_eq!(
            engine.compute(&sym("IPO"), &snap, false, &mut cache),
            Err(SkipReason::MissingPrevDailyClose)
        );
        assert!(cache.is_empty());

        assert!(engine.compute(&sym("IPO"), &snap, true, &mut cache).is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn validation_order() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();

        // No minute bar beats no latest trade.
        let empty = Snapshot::default();
        assert_eq!(
            engine.compute(&sym("X"), &empty, false, &mut cache),
            Err(SkipReason::MissingMinuteBar)
        );

        let mut snap = snapshot(101.0, 100.0, Some(100.0), 500, 60);
        snap.latest_trade.as_mut().unwrap().timestamp = None;
        assert_eq!(
            engine.compute(&sym("X"), &snap, false, &mut cache),
            Err(SkipReason::MissingLatestTrade)
        );

        let mut snap = snapshot(101.0, 100.0, Some(100.0), 500, 60);
        snap.daily_bar = None;
        snap.prev_daily_bar = None;
        assert_eq!(
            engine.compute(&sym("X"), &snap, false, &mut cache),
            Err(SkipReason::MissingDailyClose)
        );

        let mut snap = snapshot(101.0, 0.0, Some(100.0), 500, 60);
        snap.minute_bar.as_mut().unwrap().volume = None;
        assert_eq!(
            engine.compute(&sym("X"), &snap, false, &mut cache),
            Err(SkipReason::MissingMinuteVolume)
        );

        let snap = snapshot(101.0, 0.0, Some(100.0), 500, 60);
        assert!(matches!(
            engine.compute(&sym("X"), &snap, false, &mut cache),
            Err(SkipReason::InvalidPrice { field: "day_close", .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn overflowing_gradients_skip_without_touching_cache() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();

        let snap = snapshot(1e300, 1e-300, Some(1e-300), 500, 60);
        assert!(matches!(
            engine.compute(&sym("X"), &snap, false, &mut cache),
            Err(SkipReason::InvalidPrice { field: "percent", .. })
        ));
        assert!(matches!(
            engine.compute(&sym("X"), &snap, true, &mut cache),
            Err(SkipReason::InvalidPrice { field: "percent", .. })
        ));
        assert!(cache.is_empty());

        // Finite inputs and outputs, but the change against a stored extreme overflows.
        cache.put(
            sym("Y"),
            ObservationEntry {
                recent_gradient: -f64::MAX,
                volume: 0,
                trades: 0,
            },
        );
        let snap = snapshot(f64::MAX / 200.0, 1.0, Some(f64::MAX / 200.0), 500, 60);
        assert!(matches!(
            engine.compute(&sym("Y"), &snap, false, &mut cache),
            Err(SkipReason::InvalidPrice { field: "gradient_change", .. })
        ));
        assert_eq!(cache.get("Y").unwrap().recent_gradient, -f64::MAX);
    }

    #[test]
    fn extreme_cached_counts_saturate() {
        let engine = MetricEngine::default();
        let mut cache = ObservationCache::new();
        cache.put(
            sym("MSFT"),
            ObservationEntry {
                recent_gradient: 0.0,
                volume: i64::MIN,
                trades: i64::MIN,
            },
        );

        let snap = snapshot(101.0, 100.0, Some(100.0), 500, 60);
        let r = engine.compute(&sym("MSFT"), &snap, false, &mut cache).unwrap();
        assert_eq!(r.volume_change, i64::MAX);
        assert_eq!(r.trades_change, i64::MAX);
        assert_eq!(cache.get("MSFT").unwrap().volume, 500);
    }

    #[test]
    fn process_walks_universe_in_order() {
        let payload = br#"{
            "BBB": {"latestTrade": {"t": "2024-05-01T13:45:00Z", "p": 10.5},
                    "minuteBar": {"v": 900, "n": 120}, "dailyBar": {"c": 10.0},
                    "prevDailyBar": {"c": 10.0}},
            "AAA": {"latestTrade": {"t": "2024-05-01T13:45:00Z", "p": 20.0},
                    "minuteBar": {"v": 100, "n": 10}, "dailyBar": {"c": 20.0},
                    "prevDailyBar": {"c": 19.0}},
            "CCC": {"minuteBar": {"n": "lots"}},
            "DDD": {"latestTrade": {"t": "2024-05-01T13:45:00Z", "p": 5.0},
                    "minuteBar": {"v": 300, "n": 55}, "dailyBar": {"c": 4.0},
                    "prevDailyBar": {"c": 4.0}}
        }"#;
        let set = SnapshotSet::from_slice(payload).unwrap();
        let universe: Vec<Symbol> = ["DDD", "AAA", "BBB", "CCC", "EEE"]
            .into_iter()
            .map(sym)
            .collect();

        let mut cache = ObservationCache::new();
        let out = MetricEngine::default().process(&universe, &set, false, &mut cache);

        let got: Vec<_> = out.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(got, vec!["DDD", "BBB"]);
        assert_eq!(out.skipped, 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("AAA").is_none());
    }
}
