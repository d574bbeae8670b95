//! Report ordering.

use crate::engine::MetricResult;

/// Sorts by minute trade count, busiest first. Stable: equal counts keep their
/// input (universe) order, so reports don't shuffle between identical runs.
pub fn rank_by_trades(results: &mut [MetricResult]) {
    results.sort_by(|a, b| b.trades.cmp(&a.trades));
}
