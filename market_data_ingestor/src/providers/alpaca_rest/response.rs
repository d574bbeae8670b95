use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    errors::DecodeError,
    models::snapshot::{Snapshot, SnapshotBar, Trade},
};

#[derive(Deserialize, Debug, Default)]
pub struct AlpacaTrade {
    #[serde(rename = "t", default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "p", default)]
    pub price: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AlpacaSnapshotBar {
    #[serde(rename = "c", default)]
    pub close: Option<f64>,
    #[serde(rename = "v", default, deserialize_with = "lenient_count")]
    pub volume: Option<i64>,
    #[serde(rename = "n", default, deserialize_with = "lenient_count")]
    pub trade_count: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlpacaSnapshot {
    #[serde(default)]
    pub latest_trade: Option<AlpacaTrade>,
    #[serde(default)]
    pub minute_bar: Option<AlpacaSnapshotBar>,
    #[serde(default)]
    pub daily_bar: Option<AlpacaSnapshotBar>,
    #[serde(default)]
    pub prev_daily_bar: Option<AlpacaSnapshotBar>,
}

/// Counts arrive as integers, but some feeds report fractional volume.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let n: Option<serde_json::Number> = Option::deserialize(deserializer)?;
    Ok(n.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))))
}

impl From<AlpacaTrade> for Trade {
    fn from(t: AlpacaTrade) -> Self {
        Trade {
            timestamp: t.timestamp,
            price: t.price,
        }
    }
}

impl From<AlpacaSnapshotBar> for SnapshotBar {
    fn from(b: AlpacaSnapshotBar) -> Self {
        SnapshotBar {
            close: b.close,
            volume: b.volume,
            trade_count: b.trade_count,
        }
    }
}

impl From<AlpacaSnapshot> for Snapshot {
    fn from(s: AlpacaSnapshot) -> Self {
        Snapshot {
            latest_trade: s.latest_trade.map(Into::into),
            minute_bar: s.minute_bar.map(Into::into),
            daily_bar: s.daily_bar.map(Into::into),
            prev_daily_bar: s.prev_daily_bar.map(Into::into),
        }
    }
}

/// A decoded multi-symbol snapshot response.
///
/// Decoding is two-level: the payload as a whole must be a JSON object keyed by
/// symbol (otherwise [`SnapshotSet::from_slice`] fails), while each symbol's record is
/// decoded on access so that one odd record cannot sink the rest.
#[derive(Debug, Default)]
pub struct SnapshotSet {
    records: IndexMap<String, Value>,
}

impl SnapshotSet {
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(payload)?;
        match value {
            Value::Object(map) => Ok(Self {
                records: map.into_iter().collect(),
            }),
            Value::Null => Err(DecodeError::NotAnObject("null")),
            Value::Bool(_) => Err(DecodeError::NotAnObject("a boolean")),
            Value::Number(_) => Err(DecodeError::NotAnObject("a number")),
            Value::String(_) => Err(DecodeError::NotAnObject("a string")),
            Value::Array(_) => Err(DecodeError::NotAnObject("an array")),
        }
    }

    /// Looks up and decodes one symbol's snapshot.
    ///
    /// `None` when the symbol is absent from the response or mapped to `null`.
    pub fn get(&self, symbol: &str) -> Option<Result<Snapshot, serde_json::Error>> {
        match self.records.get(symbol)? {
            Value::Null => None,
            v => Some(AlpacaSnapshot::deserialize(v).map(Snapshot::from)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}
