//! Snapshot momentum scanner.
//!
//! Polls one multi-symbol snapshot, derives short-horizon signals per symbol
//! (price change against the session's reference price, intraday gradient, and
//! volume/trade deltas against the previous run), ranks them and renders a report.
//!
//! The pieces, leaves first:
//! - [`session`]: Eastern wall clock and pre-market flag from a UTC instant.
//! - [`cache`]: per-symbol observations from the previous successful run.
//! - [`engine`]: one snapshot in, one [`engine::MetricResult`] or [`engine::SkipReason`] out.
//! - [`rank`]: report ordering.
//! - [`report`] and [`delivery`]: HTML output and where it goes afterwards.
//! - [`run`]: the whole pipeline for one invocation.

pub mod cache;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod errors;
pub mod rank;
pub mod report;
pub mod run;
pub mod session;
pub mod universe;
