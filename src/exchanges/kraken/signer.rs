use crate::core::config::ConfigError;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{SignatureResult, SignedRequest, Signer};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256, Sha512};
use std::collections::HashMap;

type HmacSha512 = Hmac<Sha512>;

pub struct KrakenSigner {
    api_key: Secret<String>,
    secret: Secret<Vec<u8>>,
}

impl KrakenSigner {
    /// `private_key` is the base64 API secret shown by Kraken
    pub fn new(api_key: Secret<String>, private_key: &Secret<String>) -> Result<Self, ConfigError> {
        let secret = general_purpose::STANDARD
            .decode(private_key.expose_secret())
            .map_err(|e| {
                ConfigError::InvalidConfiguration(format!(
                    "Kraken private key is not valid base64: {}",
                    e
                ))
            })?;

        Ok(Self {
            api_key,
            secret: Secret::new(secret),
        })
    }

    /// `API-Sign`: base64 HMAC-SHA512 over path + SHA256(nonce + post data),
    /// keyed with the decoded secret
    pub fn generate_signature(
        &self,
        path: &str,
        nonce: u64,
        post_data: &str,
    ) -> Result<String, ExchangeError> {
        let mut sha = Sha256::new();
        sha.update(nonce.to_string().as_bytes());
        sha.update(post_data.as_bytes());
        let digest = sha.finalize();

        let mut mac = HmacSha512::new_from_slice(self.secret.expose_secret())
            .map_err(|e| ExchangeError::AuthError(format!("Failed to create HMAC: {}", e)))?;
        mac.update(path.as_bytes());
        mac.update(&digest);

        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for KrakenSigner {
    fn sign_request(
        &self,
        _method: &str,
        endpoint: &str,
        _query_string: &str,
        body: &[u8],
        timestamp: u64,
    ) -> SignatureResult {
        // The nonce travels inside the signed body
        let nonce = timestamp;
        let fields = std::str::from_utf8(body)
            .map_err(|e| ExchangeError::AuthError(format!("Invalid body encoding: {}", e)))?;
        let post_data = if fields.is_empty() {
            format!("nonce={}", nonce)
        } else {
            format!("nonce={}&{}", nonce, fields)
        };

        let signature = self.generate_signature(endpoint, nonce, &post_data)?;

        let mut headers = HashMap::new();
        headers.insert(
            "API-Key".to_string(),
            self.api_key.expose_secret().clone(),
        );
        headers.insert("API-Sign".to_string(), signature);
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        );

        Ok(SignedRequest {
            headers,
            query_params: Vec::new(),
            body: Some(post_data.into_bytes()),
        })
    }
}
