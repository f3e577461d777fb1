use crate::core::config::Verbosity;
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, instrument, trace, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// REST client trait for making HTTP requests
///
/// Successful (2xx) calls yield the raw response body so that each exchange
/// can decode its own envelope. Non-2xx statuses and network failures are
/// returned as [`ExchangeError::Transport`] and never decoded.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `query_params` - Query parameters as key-value pairs, percent-encoded on the wire
    /// * `authenticated` - Whether to sign the request
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, ExchangeError>;

    /// Make a POST request with a form-encoded body
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path
    /// * `form` - Body fields as key-value pairs
    /// * `authenticated` - Whether to sign the request
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt
    pub retry_base_delay_ms: u64,
    /// User agent string to include in requests
    pub user_agent: String,
    /// `Debug` logs every request and response
    pub verbosity: Verbosity,
}

impl RestClientConfig {
    /// Create a new configuration
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the API
    /// * `exchange_name` - Name of the exchange
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            max_retries: 3,
            retry_base_delay_ms: 100,
            user_agent: "tradeledger/0.1".to_string(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry
    pub fn with_retry_base_delay(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ExchangeError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Get the current timestamp in milliseconds
    fn get_timestamp() -> Result<u64, ExchangeError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| ExchangeError::AuthError(format!("Failed to get timestamp: {}", e)))
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Create query string from parameters
    fn create_query_string(params: &[(&str, &str)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor(self.config.retry_base_delay_ms / 2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries as usize)
    }

    /// Make a request, retrying transient failures
    #[instrument(skip(self, query_params, body), fields(exchange = %self.config.exchange_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
        body: &[u8],
        authenticated: bool,
    ) -> Result<String, ExchangeError> {
        RetryIf::spawn(
            self.retry_strategy(),
            || self.send_once(method.clone(), endpoint, query_params, body, authenticated),
            |e: &ExchangeError| {
                let transient = e.is_transient();
                if transient {
                    warn!(exchange = %self.config.exchange_name, "Transient failure: {}", e);
                }
                transient
            },
        )
        .await
    }

    /// One attempt: sign, send, and read the body
    async fn send_once(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
        body: &[u8],
        authenticated: bool,
    ) -> Result<String, ExchangeError> {
        let url = self.build_url(endpoint);
        let query_string = Self::create_query_string(query_params);

        let mut headers = HeaderMap::new();
        if !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
        let mut extra_params = Vec::new();
        let mut body = body.to_vec();

        if authenticated {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ExchangeError::AuthError(
                    "Authentication required but no signer provided".to_string(),
                )
            })?;
            let timestamp = Self::get_timestamp()?;
            let signed =
                signer.sign_request(method.as_str(), endpoint, &query_string, &body, timestamp)?;

            for (key, value) in signed.headers {
                let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    ExchangeError::AuthError(format!("Invalid header name {}: {}", key, e))
                })?;
                let value = HeaderValue::from_str(&value).map_err(|e| {
                    ExchangeError::AuthError(format!("Invalid value for header {}: {}", key, e))
                })?;
                headers.insert(name, value);
            }
            extra_params = signed.query_params;
            if let Some(signed_body) = signed.body {
                body = signed_body;
            }
        }

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(headers)
            .query(query_params);
        if !extra_params.is_empty() {
            request = request.query(&extra_params);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        if self.config.verbosity.is_debug() {
            debug!(exchange = %self.config.exchange_name, %method, %url, query = %query_string, "Sending request");
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ExchangeError::network(format!("Failed to read response body: {}", e)))?;

        if self.config.verbosity.is_debug() {
            debug!(exchange = %self.config.exchange_name, status = status.as_u16(), body = %response_text, "Received response");
        } else {
            trace!("Response body: {}", response_text);
        }

        if status.is_success() {
            Ok(response_text)
        } else {
            Err(ExchangeError::Transport {
                status: Some(status.as_u16()),
                body: Some(response_text),
                message: format!("HTTP {}", status),
            })
        }
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, ExchangeError> {
        self.make_request(Method::GET, endpoint, query_params, &[], authenticated)
            .await
    }

    #[instrument(skip(self, form), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<String, ExchangeError> {
        let body = encode_form(form);
        self.make_request(Method::POST, endpoint, &[], body.as_bytes(), authenticated)
            .await
    }
}

/// Encode key-value pairs as an `application/x-www-form-urlencoded` body
fn encode_form(form: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish()
}
