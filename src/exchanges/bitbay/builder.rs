use crate::core::config::{CodecConfig, Credentials, Verbosity};
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClientConfig;
use crate::core::types::HistoryQuery;
use crate::exchanges::bitbay::{connector::BitbayConnector, signer::BitbaySigner};

pub const DEFAULT_BASE_URL: &str = "https://api.bitbay.net";

/// Credential names BitBay needs
pub const PUBLIC_KEY: &str = "publicKey";
pub const PRIVATE_KEY: &str = "privateKey";

/// Builder for creating BitBay connectors
pub struct BitbayBuilder {
    credentials: Credentials,
    codec: CodecConfig,
    base_url: Option<String>,
    query: HistoryQuery,
    rest_timeout: u64,
    rest_max_retries: u32,
    retry_base_delay_ms: Option<u64>,
    verbosity: Verbosity,
}

impl BitbayBuilder {
    /// Create a new `BitbayBuilder` with default settings
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            codec: CodecConfig::default(),
            base_url: None,
            query: HistoryQuery::default(),
            rest_timeout: 30,
            rest_max_retries: 3,
            retry_base_delay_ms: None,
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the shared codec configuration
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    /// Set base URL for REST API
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Restrict the history request; the default fetches everything
    pub fn with_history_query(mut self, query: HistoryQuery) -> Self {
        self.query = query;
        self
    }

    /// Set REST client timeout
    pub fn with_rest_timeout(mut self, timeout: u64) -> Self {
        self.rest_timeout = timeout;
        self
    }

    /// Set REST client maximum retries
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

    /// Build the connector. Fails if a required credential is missing or
    /// supplied twice; performs no I/O.
    pub fn build(self) -> Result<BitbayConnector, ExchangeError> {
        let public_key = self.credentials.require(PUBLIC_KEY)?;
        let private_key = self.credentials.require(PRIVATE_KEY)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut rest_config = RestClientConfig::new(base_url, "bitbay".to_string())
            .with_timeout(self.rest_timeout)
            .with_max_retries(self.rest_max_retries)
            .with_verbosity(self.verbosity);
        if let Some(delay) = self.retry_base_delay_ms {
            rest_config = rest_config.with_retry_base_delay(delay);
        }

        Ok(BitbayConnector::new(
            BitbaySigner::new(public_key, private_key),
            rest_config,
            self.codec,
            self.query,
        ))
    }
}

/// Create a BitBay connector with default settings
pub fn build_connector(
    credentials: Credentials,
    codec: CodecConfig,
) -> Result<BitbayConnector, ExchangeError> {
    BitbayBuilder::new(credentials).with_codec(codec).build()
}
