use crate::core::errors::ExchangeError;
use std::collections::HashMap;

/// What a signer adds to an outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedRequest {
    /// Headers to attach
    pub headers: HashMap<String, String>,
    /// Extra query parameters appended after the request's own
    pub query_params: Vec<(String, String)>,
    /// Replacement body, for exchanges that sign fields inside the body
    pub body: Option<Vec<u8>>,
}

/// Result type for signing operations
pub type SignatureResult = Result<SignedRequest, ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations hold the credentials of exactly one adapter. Signing is a
/// pure function of its arguments and those credentials (apart from values
/// that are not part of the signature, such as request ids), so it can be
/// replayed offline with a fixed timestamp.
pub trait Signer: Send + Sync {
    /// Sign a request
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `endpoint` - API endpoint path
    /// * `query_string` - Query string (without leading '?')
    /// * `body` - Raw request body bytes
    /// * `timestamp` - Request timestamp in milliseconds
    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        query_string: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignatureResult;
}
