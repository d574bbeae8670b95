//! Provider abstraction for market data sources.
//!
//! This module defines the [`SnapshotProvider`] trait, which serves as a unified interface
//! for fetching point-in-time snapshots from any market data vendor (e.g., Alpaca).
//!
//! A provider only moves bytes: it returns the raw response payload and leaves decoding
//! to the caller, so that transport failures and malformed payloads stay distinct.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn SnapshotProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::request_params::SnapshotRequestParams;
//! use market_data_ingestor::providers::{ProviderError, SnapshotProvider};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl SnapshotProvider for MyProvider {
//!     async fn fetch_snapshots(
//!         &self,
//!         _params: &SnapshotRequestParams,
//!     ) -> Result<Vec<u8>, ProviderError> {
//!         Ok(b"{}".to_vec())
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::request_params::SnapshotRequestParams;

/// Trait for fetching snapshot payloads from a market data provider.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Fetches one snapshot payload covering every symbol in `params`.
    ///
    /// Exactly one attempt is made; retry policy belongs to whoever schedules runs.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The raw response body.
    /// * `Err(ProviderError)` - Transport failure, non-success status or invalid parameters.
    async fn fetch_snapshots(&self, params: &SnapshotRequestParams)
    -> Result<Vec<u8>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `SnapshotProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with a non-success status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },
}
