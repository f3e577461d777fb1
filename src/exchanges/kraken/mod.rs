pub mod conversions;
pub mod signer;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

pub use builder::{build_connector, KrakenBuilder};
pub use connector::KrakenConnector;
pub use rest::KRAKEN_ERROR_CODES;
pub use signer::KrakenSigner;
pub use types::{KrakenResponse, KrakenTrade, KrakenTradesHistory};
