//! Symbol universe: the validated ticker type and the list-file reader.
//!
//! The list file holds one symbol per line; only the first whitespace-separated
//! token counts, so `AAPL  Apple Inc.` is fine. Blank lines and `#` comments are
//! skipped. Tokens are upper-cased, validated, and de-duplicated in file order.

use std::{
    borrow::Borrow,
    fmt,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Longest accepted ticker.
pub const MAX_SYMBOL_LEN: usize = 15;

/// An upper-case ticker symbol, at most [`MAX_SYMBOL_LEN`] characters of
/// `[A-Z0-9./-]`.
///
/// The character set keeps symbols safe to drop into URLs and HTML unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,
    #[error("symbol {0:?} is longer than {MAX_SYMBOL_LEN} characters")]
    TooLong(String),
    #[error("symbol {0:?} contains characters outside [A-Z0-9./-]")]
    InvalidChars(String),
}

impl Symbol {
    /// Parses a raw token, upper-casing it first.
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let s = raw.trim().to_ascii_uppercase();
        if s.is_empty() {
            return Err(SymbolError::Empty);
        }
        if s.len() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong(s));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '/' | '-'))
        {
            return Err(SymbolError::InvalidChars(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

/// Errors that make the universe unusable. Both abort a run before any network call.
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read symbol list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no valid symbols found in {}", path.display())]
    Empty { path: PathBuf },
}

/// Parses list-file contents. Invalid tokens are logged and dropped.
pub fn parse_universe(contents: &str) -> Vec<Symbol> {
    let mut symbols = IndexSet::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        match Symbol::parse(token) {
            Ok(symbol) => {
                if !symbols.insert(symbol) {
                    debug!(line = lineno + 1, token, "duplicate symbol ignored");
                }
            }
            Err(e) => warn!(line = lineno + 1, "skipping symbol list entry: {e}"),
        }
    }
    symbols.into_iter().collect()
}

/// Reads the symbol list at `path`.
pub fn load_universe(path: impl AsRef<Path>) -> Result<Vec<Symbol>, UniverseError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let symbols = parse_universe(&contents);
    if symbols.is_empty() {
        return Err(UniverseError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(count = symbols.len(), path = %path.display(), "loaded symbol universe");
    Ok(symbols)
}
