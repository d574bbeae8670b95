//! Observation cache: what each symbol looked like at the previous successful run.
//!
//! One entry per symbol, overwritten (never accumulated) on every successful metric
//! computation. Entries for symbols that leave the universe stay behind untouched.
//!
//! The backing store is a pretty-printed JSON object keyed by symbol:
//!
//! ```json
//! {
//!   "AAPL": { "recent_gradient": 0.43, "volume": 12034, "trades": 311 }
//! }
//! ```
//!
//! Key order is insertion order, so a load/save cycle reproduces the file byte for byte.
//! Saving writes a sibling temp file and renames it over the target; a crash mid-save
//! leaves the previous file in place.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::universe::Symbol;

/// Last-seen values for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationEntry {
    /// Older stores wrote this as `gradient_recent`.
    #[serde(alias = "gradient_recent")]
    pub recent_gradient: f64,
    pub volume: i64,
    pub trades: i64,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write cache {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory cache, exclusively owned by one run from load to save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationCache {
    entries: IndexMap<Symbol, ObservationEntry>,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store at `path`.
    ///
    /// A missing file is an empty cache. A file that is not a JSON object is also
    /// treated as empty (with a warning); individual entries that fail to decode
    /// are dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let cache = Self::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %path.display(), "cache file unreadable, starting empty: {e}");
            Self::new()
        });
        debug!(entries = cache.len(), path = %path.display(), "loaded observation cache");
        Ok(cache)
    }

    /// Decodes a store document. Fails only when the document is not a JSON object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: IndexMap<String, Value> = serde_json::from_slice(bytes)?;
        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let symbol = match Symbol::parse(&key) {
                Ok(symbol) => symbol,
                Err(e) => {
                    warn!("dropping cache entry: {e}");
                    continue;
                }
            };
            match ObservationEntry::deserialize(&value) {
                Ok(entry) => {
                    entries.insert(symbol, entry);
                }
                Err(e) => warn!(%symbol, "dropping malformed cache entry: {e}"),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, symbol: &str) -> Option<&ObservationEntry> {
        self.entries.get(symbol)
    }

    /// Upserts by symbol. An existing entry keeps its position in the store.
    pub fn put(&mut self, symbol: Symbol, entry: ObservationEntry) {
        self.entries.insert(symbol, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &ObservationEntry)> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Writes the whole cache to `path`, replacing what was there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CacheError> {
        let path = path.as_ref();
        let json = self.to_json()?;

        let tmp = tmp_path(path);
        let write_err = |source: std::io::Error| CacheError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp, json.as_bytes()).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        debug!(entries = self.len(), path = %path.display(), "saved observation cache");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "cache".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn entry(g: f64, v: i64, t: i64) -> ObservationEntry {
        ObservationEntry {
            recent_gradient: g,
            volume: v,
            trades: t,
        }
    }

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ObservationCache::load(dir.path().join("previous_results.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_in_place() {
        let mut cache = ObservationCache::new();
        cache.put(sym("AAPL"), entry(1.0, 10, 100));
        cache.put(sym("MSFT"), entry(2.0, 20, 200));
        cache.put(sym("AAPL"), entry(3.0, 30, 300));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("AAPL"), Some(&entry(3.0, 30, 300)));
        let order: Vec<_> = cache.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT"]);
        assert!(cache.get("TSLA").is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = ObservationCache::new();
        cache.put(sym("ZZZ"), entry(-0.123456789012345, 5, 60));
        cache.put(sym("AAA"), entry(1e-9, 0, 50));
        cache.save(&path).unwrap();

        let first = std::fs::read(&path).unwrap();
        let reloaded = ObservationCache::load(&path).unwrap();
        assert_eq!(reloaded, cache);

        reloaded.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
        assert!(!dir.path().join("cache.json.tmp").exists());
    }

    #[test]
    fn accepts_legacy_field_name_and_drops_bad_entries() {
        let doc = br#"{
            "AAPL": {"gradient_recent": 0.5, "volume": 100, "trades": 60},
            "MSFT": {"recent_gradient": 1.5, "volume": 10},
            "bad symbol!": {"recent_gradient": 1.0, "volume": 1, "trades": 1},
            "TSLA": {"recent_gradient": -2.0, "volume": 7, "trades": 99}
        }"#;
        let cache = ObservationCache::from_slice(doc).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("AAPL"), Some(&entry(0.5, 100, 60)));
        assert_eq!(cache.get("TSLA"), Some(&entry(-2.0, 7, 99)));

        let json = cache.to_json().unwrap();
        assert!(json.contains("\"recent_gradient\": 0.5"));
        assert!(!json.contains("gradient_recent"));
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{\"AAPL\": {\"recent_gr").unwrap();
        assert!(ObservationCache::load(&path).unwrap().is_empty());
    }
}
