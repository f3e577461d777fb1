use crate::core::errors::ExchangeError;
use crate::core::kernel::{SignatureResult, SignedRequest, Signer};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha512;
use std::collections::HashMap;

type HmacSha512 = Hmac<Sha512>;

pub struct BitbaySigner {
    public_key: Secret<String>,
    private_key: Secret<String>,
}

impl BitbaySigner {
    pub fn new(public_key: Secret<String>, private_key: Secret<String>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    /// `API-Hash`: hex HMAC-SHA512 over publicKey + unix seconds + body,
    /// keyed with the private key. GET requests sign an empty body.
    pub fn generate_hash(&self, timestamp_secs: u64, body: &[u8]) -> Result<String, ExchangeError> {
        let mut mac = HmacSha512::new_from_slice(self.private_key.expose_secret().as_bytes())
            .map_err(|e| ExchangeError::AuthError(format!("Failed to create HMAC: {}", e)))?;

        mac.update(self.public_key.expose_secret().as_bytes());
        mac.update(timestamp_secs.to_string().as_bytes());
        mac.update(body);

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl Signer for BitbaySigner {
    fn sign_request(
        &self,
        _method: &str,
        _endpoint: &str,
        _query_string: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignatureResult {
        // BitBay expects seconds
        let timestamp_secs = timestamp / 1000;
        let hash = self.generate_hash(timestamp_secs, body)?;

        let mut headers = HashMap::new();
        headers.insert(
            "API-Key".to_string(),
            self.public_key.expose_secret().clone(),
        );
        headers.insert("API-Hash".to_string(), hash);
        headers.insert(
            "operation-id".to_string(),
            uuid::Uuid::new_v4().to_string(),
        );
        headers.insert("Request-Timestamp".to_string(), timestamp_secs.to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(SignedRequest {
            headers,
            ..SignedRequest::default()
        })
    }
}
