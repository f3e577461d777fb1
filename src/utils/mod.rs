pub mod collector;
pub mod exchange_factory;

pub use collector::{collect_transactions, CollectionReport};
pub use exchange_factory::{required_credentials, ExchangeFactory};
