//! Loading of TOML configuration files into typed structs.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for the expected shape.
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parse a TOML string into `T`.
pub fn load_toml_str<T: DeserializeOwned>(s: &str) -> Result<T, toml::de::Error> {
    toml::from_str(s)
}

/// Read and parse a TOML file into `T`.
///
/// Errors carry the offending path so the caller can report it as is.
pub fn load_toml_path<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigFileError> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_toml_str(&s).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
