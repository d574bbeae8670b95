//! Canonical in-memory representation of a point-in-time market snapshot.
//!
//! Every field is optional: vendors omit bars for symbols that have not traded in
//! the relevant window, and consumers decide which absences matter to them.

use chrono::{DateTime, Utc};

/// Latest trade for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trade {
    /// Execution time of the trade (UTC).
    pub timestamp: Option<DateTime<Utc>>,

    /// Trade price.
    pub price: Option<f64>,
}

/// The subset of an OHLCV bar that snapshot consumers read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapshotBar {
    /// Closing (or latest) price of the bar.
    pub close: Option<f64>,

    /// Volume traded during the bar interval.
    pub volume: Option<i64>,

    /// Number of trades during the bar interval.
    pub trade_count: Option<i64>,
}

/// One symbol's snapshot: latest trade plus the current minute, current day and
/// previous day bars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub latest_trade: Option<Trade>,
    pub minute_bar: Option<SnapshotBar>,
    pub daily_bar: Option<SnapshotBar>,
    pub prev_daily_bar: Option<SnapshotBar>,
}
