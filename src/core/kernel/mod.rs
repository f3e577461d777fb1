//! Exchange-agnostic transport layer.
//!
//! The kernel knows how to sign, send and retry a request, and nothing about
//! any exchange's payloads:
//!
//! - [`Signer`]: pluggable request authentication, one implementation per exchange
//! - [`RestClient`]: HTTP interface returning raw 2xx bodies, with
//!   [`ReqwestRest`] as the reqwest-backed implementation
//! - [`RestClientConfig`] / [`RestClientBuilder`]: timeout, retry and
//!   verbosity policy for one adapter's transport
//!
//! ```rust,no_run
//! use tradeledger::core::kernel::{RestClient, RestClientBuilder, RestClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RestClientConfig::new(
//!     "https://api.kraken.com".to_string(),
//!     "kraken".to_string(),
//! )
//! .with_timeout(10)
//! .with_max_retries(2);
//! let rest = RestClientBuilder::new(config).build()?;
//! let body = rest.get("/0/public/Time", &[], false).await?;
//! println!("{}", body);
//! # Ok(())
//! # }
//! ```
pub mod rest;
pub mod signer;

pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{SignatureResult, SignedRequest, Signer};
