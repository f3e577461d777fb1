use crate::core::errors::ExchangeError;
use crate::core::traits::ExchangeApi;
use crate::core::types::{ExchangeId, Transaction};
use futures_util::future::join_all;
use tracing::{error, info};

/// Outcome of querying several exchanges at once
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Transactions from every exchange that answered, grouped in adapter order
    pub transactions: Vec<Transaction>,
    pub failures: Vec<(ExchangeId, ExchangeError)>,
}

impl CollectionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_exchanges(&self) -> Vec<ExchangeId> {
        self.failures.iter().map(|(exchange, _)| *exchange).collect()
    }
}

/// Fetch history from all adapters concurrently.
///
/// A failing exchange does not hide the others: its error is logged once and
/// recorded in `failures`.
pub async fn collect_transactions(apis: &[Box<dyn ExchangeApi>]) -> CollectionReport {
    let results = join_all(apis.iter().map(|api| async move {
        (api.exchange(), api.fetch_transactions().await)
    }))
    .await;

    let mut report = CollectionReport::default();
    for (exchange, result) in results {
        match result {
            Ok(transactions) => {
                info!(
                    exchange = %exchange,
                    count = transactions.len(),
                    "Fetched transactions"
                );
                report.transactions.extend(transactions);
            }
            Err(e) => {
                error!(exchange = %exchange, kind = ?e.kind(), "Failed to fetch transactions: {}", e);
                report.failures.push((exchange, e));
            }
        }
    }
    report
}
