pub mod bitbay;
pub mod kraken;
