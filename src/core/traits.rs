use crate::core::{
    errors::ExchangeError,
    types::{ExchangeId, Transaction},
};
use async_trait::async_trait;
use tracing::error;

/// Trade history of one exchange, normalized to [`Transaction`]s.
///
/// Every exchange adapter implements this the same way, so callers can hold
/// a `Box<dyn ExchangeApi>` without knowing which exchange is behind it.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Which exchange this adapter talks to
    fn exchange(&self) -> ExchangeId;

    /// Fetch and normalize the full trade history.
    ///
    /// Transactions are returned in the order the exchange reported them.
    /// An exchange with no history yields `Ok(vec![])`.
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ExchangeError>;

    /// Like [`fetch_transactions`](Self::fetch_transactions), but a failure
    /// is logged once at error level and reported as an empty history.
    async fn transactions(&self) -> Vec<Transaction> {
        match self.fetch_transactions().await {
            Ok(transactions) => transactions,
            Err(e) => {
                error!(exchange = %self.exchange(), kind = ?e.kind(), "Failed to fetch transactions: {}", e);
                Vec::new()
            }
        }
    }
}
