//! Scanner configuration.
//!
//! Loaded from an optional TOML file; every key has a default, so an empty file (or
//! no file) gives a working setup. Command-line flags override file values.
//! Credentials are never read from here, only from the environment.
//!
//! ```toml
//! symbol_list = "combined.lis"
//! cache_path = "previous_results.json"
//! report_path = "latest.html"
//! min_minute_trades = 50
//! highlight_trades = 1000
//! refresh_secs = 60
//!
//! [provider]
//! base_url = "https://data.alpaca.markets"
//! timeout_secs = 120
//! feed = "sip"
//!
//! [delivery]
//! program = "scp"
//! args = ["-q", "{report}", "user@host:/var/www/latest/index.html"]
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use market_data_ingestor::{
    models::request_params::Feed,
    providers::alpaca_rest::{ProviderOptions, provider::DEFAULT_BASE_URL},
};
use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigFileError, load_toml_path};

use crate::{
    delivery::CommandDelivery,
    engine::DEFAULT_MIN_MINUTE_TRADES,
    report::{DEFAULT_HIGHLIGHT_TRADES, DEFAULT_REFRESH_SECS},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    /// One symbol per line.
    pub symbol_list: PathBuf,
    pub cache_path: PathBuf,
    pub report_path: PathBuf,
    pub min_minute_trades: i64,
    pub highlight_trades: i64,
    pub refresh_secs: u32,
    pub provider: ProviderConfig,
    pub delivery: Option<CommandDelivery>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbol_list: PathBuf::from("combined.lis"),
            cache_path: PathBuf::from("previous_results.json"),
            report_path: PathBuf::from("latest.html"),
            min_minute_trades: DEFAULT_MIN_MINUTE_TRADES,
            highlight_trades: DEFAULT_HIGHLIGHT_TRADES,
            refresh_secs: DEFAULT_REFRESH_SECS,
            provider: ProviderConfig::default(),
            delivery: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub feed: Option<Feed>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            feed: None,
        }
    }
}

impl ProviderConfig {
    pub fn options(&self) -> ProviderOptions {
        ProviderOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl ScannerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        load_toml_path(path)
    }
}
