use crate::core::config::{CodecConfig, Credentials, Verbosity};
use crate::core::errors::ExchangeError;
use crate::core::traits::ExchangeApi;
use crate::core::types::ExchangeId;
use crate::exchanges::{bitbay, kraken};

/// Credential names each exchange expects
pub fn required_credentials(exchange: ExchangeId) -> &'static [&'static str] {
    match exchange {
        ExchangeId::Bitbay => &[bitbay::builder::PUBLIC_KEY, bitbay::builder::PRIVATE_KEY],
        ExchangeId::Kraken => &[kraken::builder::PUBLIC_KEY, kraken::builder::PRIVATE_KEY],
    }
}

/// Factory for creating exchange connectors
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Create the adapter for `exchange` with default transport settings
    pub fn create(
        exchange: ExchangeId,
        credentials: Credentials,
        codec: CodecConfig,
    ) -> Result<Box<dyn ExchangeApi>, ExchangeError> {
        Self::create_with_verbosity(exchange, credentials, codec, Verbosity::Normal)
    }

    pub fn create_with_verbosity(
        exchange: ExchangeId,
        credentials: Credentials,
        codec: CodecConfig,
        verbosity: Verbosity,
    ) -> Result<Box<dyn ExchangeApi>, ExchangeError> {
        match exchange {
            ExchangeId::Bitbay => Ok(Box::new(
                bitbay::BitbayBuilder::new(credentials)
                    .with_codec(codec)
                    .with_verbosity(verbosity)
                    .build()?,
            )),
            // Kraken reports epoch timestamps only; the codec has nothing to configure
            ExchangeId::Kraken => Ok(Box::new(
                kraken::KrakenBuilder::new(credentials)
                    .with_verbosity(verbosity)
                    .build()?,
            )),
        }
    }
}
