pub mod conversions;
pub mod signer;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

// Re-export main components
pub use builder::{build_connector, BitbayBuilder};
pub use connector::BitbayConnector;
pub use rest::BITBAY_ERROR_CODES;
pub use signer::BitbaySigner;
pub use types::{BitbayHistoryQuery, BitbayPage, BitbayResponse, BitbayTransaction};
