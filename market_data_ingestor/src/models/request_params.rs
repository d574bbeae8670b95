use serde::{Deserialize, Serialize};

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Parameters for a multi-symbol snapshot request.
///
/// Vendor-agnostic: each [`SnapshotProvider`](crate::providers::SnapshotProvider)
/// maps these onto its own query format.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotRequestParams {
    /// Symbols to request, already normalized to upper case (e.g. `["AAPL", "MSFT"]`).
    pub symbols: Vec<String>,

    /// Source feed. `None` leaves the choice to the vendor's account default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
}

impl SnapshotRequestParams {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            feed: None,
        }
    }

    pub fn with_feed(mut self, feed: Option<Feed>) -> Self {
        self.feed = feed;
        self
    }
}
