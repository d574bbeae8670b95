//! Alpaca market data REST API (`data.alpaca.markets`).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{AlpacaProvider, Credentials, ProviderOptions};
pub use response::SnapshotSet;
