use market_data_ingestor::{
    errors::DecodeError,
    providers::{ProviderError, ProviderInitError},
};
use shared_utils::config::ConfigFileError;
use thiserror::Error;

use crate::{cache::CacheError, report::ReportError, universe::UniverseError};

/// Everything that fails a run. Per-symbol skips and delivery failures are not
/// here: the first never leaves the engine, the second is only logged.
#[derive(Debug, Error)]
pub enum RunError {
    /// Unreadable configuration file.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    /// Missing or unusable credentials.
    #[error("provider setup failed: {0}")]
    Credentials(#[from] ProviderInitError),

    /// Missing or empty symbol universe.
    #[error(transparent)]
    Universe(#[from] UniverseError),

    /// Network or transport failure; the cache is left untouched.
    #[error("snapshot fetch failed: {0}")]
    Fetch(#[from] ProviderError),

    /// The snapshot payload as a whole could not be parsed; the cache is left untouched.
    #[error("snapshot parse failed: {0}")]
    Parse(#[from] DecodeError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl RunError {
    /// Raised before any network call: bad configuration, credentials or universe.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RunError::ConfigFile(_) | RunError::Credentials(_) | RunError::Universe(_)
        )
    }
}
