use crate::core::config::{Credentials, Verbosity};
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClientConfig;
use crate::core::types::HistoryQuery;
use crate::exchanges::kraken::{connector::KrakenConnector, signer::KrakenSigner};

pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

pub const PUBLIC_KEY: &str = "publicKey";
pub const PRIVATE_KEY: &str = "privateKey";

/// Builder for creating Kraken connectors
pub struct KrakenBuilder {
    credentials: Credentials,
    base_url: Option<String>,
    query: HistoryQuery,
    rest_timeout: u64,
    rest_max_retries: u32,
    retry_base_delay_ms: Option<u64>,
    verbosity: Verbosity,
}

impl KrakenBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: None,
            query: HistoryQuery::default(),
            rest_timeout: 30,
            rest_max_retries: 3,
            retry_base_delay_ms: None,
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Only the time bounds are sent; markets are filtered after decoding
    pub fn with_history_query(mut self, query: HistoryQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_rest_timeout(mut self, timeout: u64) -> Self {
        self.rest_timeout = timeout;
        self
    }

    pub fn with_rest_max_retries(mut self, retries: u32) -> Self {
        self.rest_max_retries = retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = Some(delay_ms);
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Build the connector. The private key is decoded here, so a malformed
    /// secret fails before any request is made.
    pub fn build(self) -> Result<KrakenConnector, ExchangeError> {
        let public_key = self.credentials.require(PUBLIC_KEY)?;
        let private_key = self.credentials.require(PRIVATE_KEY)?;
        let signer = KrakenSigner::new(public_key, &private_key)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut rest_config = RestClientConfig::new(base_url, "kraken".to_string())
            .with_timeout(self.rest_timeout)
            .with_max_retries(self.rest_max_retries)
            .with_verbosity(self.verbosity);
        if let Some(delay) = self.retry_base_delay_ms {
            rest_config = rest_config.with_retry_base_delay(delay);
        }

        Ok(KrakenConnector::new(signer, rest_config, self.query))
    }
}

/// Create a Kraken connector with default settings
pub fn build_connector(credentials: Credentials) -> Result<KrakenConnector, ExchangeError> {
    KrakenBuilder::new(credentials).build()
}
