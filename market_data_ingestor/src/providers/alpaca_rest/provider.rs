use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::request_params::SnapshotRequestParams,
    providers::{
        ApiSnafu, ClientBuildSnafu, InvalidApiKeySnafu, MissingEnvVarSnafu, ProviderError,
        ProviderInitError, ReqwestSnafu, SnapshotProvider, alpaca_rest::params::construct_params,
    },
};

pub const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets";
const SNAPSHOTS_PATH: &str = "/v2/stocks/snapshots";

pub const KEY_ID_ENV: &str = "APCA_API_KEY_ID";
pub const SECRET_KEY_ENV: &str = "APCA_API_SECRET_KEY";

/// Alpaca API key pair. Never printed; `Debug` redacts both halves.
#[derive(Debug)]
pub struct Credentials {
    pub key_id: SecretString,
    pub secret_key: SecretString,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            key_id: SecretString::from(key_id.into()),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        let key_id = get_env_var(KEY_ID_ENV).context(MissingEnvVarSnafu)?;
        let secret_key = get_env_var(SECRET_KEY_ENV).context(MissingEnvVarSnafu)?;
        Ok(Self::new(key_id, secret_key))
    }
}

/// Transport settings for [`AlpacaProvider`].
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Scheme and host, without a trailing path (e.g. `https://data.alpaca.markets`).
    pub base_url: String,
    /// Upper bound on the whole request, connect through body.
    pub timeout: Duration,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct AlpacaProvider {
    client: Client,
    snapshots_url: String,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider with the given key pair.
    pub fn new(
        credentials: &Credentials,
        options: ProviderOptions,
    ) -> Result<Self, ProviderInitError> {
        let mut key_id = header::HeaderValue::from_str(credentials.key_id.expose_secret())
            .context(InvalidApiKeySnafu)?;
        key_id.set_sensitive(true);
        let mut secret_key = header::HeaderValue::from_str(credentials.secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_key.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert("APCA-API-KEY-ID", key_id);
        headers.insert("APCA-API-SECRET-KEY", secret_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            snapshots_url: format!(
                "{}{}",
                options.base_url.trim_end_matches('/'),
                SNAPSHOTS_PATH
            ),
        })
    }

    /// Creates a new Alpaca provider with credentials from the environment.
    pub fn from_env(options: ProviderOptions) -> Result<Self, ProviderInitError> {
        Self::new(&Credentials::from_env()?, options)
    }
}

#[async_trait]
impl SnapshotProvider for AlpacaProvider {
    async fn fetch_snapshots(
        &self,
        params: &SnapshotRequestParams,
    ) -> Result<Vec<u8>, ProviderError> {
        let query = construct_params(params)?;

        debug!(
            symbols = params.symbols.len(),
            url = %self.snapshots_url,
            "requesting snapshots"
        );
        let response = self
            .client
            .get(&self.snapshots_url)
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.bytes().await.context(ReqwestSnafu)?;
        debug!(bytes = body.len(), "snapshot payload received");
        Ok(body.to_vec())
    }
}
