pub mod core;
pub mod exchanges;
pub mod utils;

pub use crate::core::{errors::ExchangeError, traits::ExchangeApi, types::*};
pub use exchanges::bitbay::BitbayConnector;
pub use exchanges::kraken::KrakenConnector;
pub use utils::{collect_transactions, CollectionReport, ExchangeFactory};
