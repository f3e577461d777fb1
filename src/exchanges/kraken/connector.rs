use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
use crate::core::traits::ExchangeApi;
use crate::core::types::{ExchangeId, HistoryQuery, Transaction};
use crate::exchanges::kraken::conversions::{convert_kraken_trade, history_query_to_form};
use crate::exchanges::kraken::rest::{decode_trades_history, KrakenRest};
use crate::exchanges::kraken::signer::KrakenSigner;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

type Connect<R> = Box<dyn Fn() -> Result<R, ExchangeError> + Send + Sync>;

/// Kraken trade history adapter
pub struct KrakenConnector<R: RestClient = ReqwestRest> {
    connect: Connect<R>,
    rest_config: Option<RestClientConfig>,
    query: HistoryQuery,
    rest: OnceCell<KrakenRest<R>>,
}

impl KrakenConnector {
    pub fn new(signer: KrakenSigner, rest_config: RestClientConfig, query: HistoryQuery) -> Self {
        let signer = Arc::new(signer);
        let config = rest_config.clone();
        Self {
            connect: Box::new(move || {
                RestClientBuilder::new(config.clone())
                    .with_signer(signer.clone())
                    .build()
            }),
            rest_config: Some(rest_config),
            query,
            rest: OnceCell::new(),
        }
    }
}

impl<R: RestClient + Clone + 'static> KrakenConnector<R> {
    /// Use a transport built elsewhere; it is responsible for signing
    pub fn with_rest(rest: R, query: HistoryQuery) -> Self {
        Self {
            connect: Box::new(move || Ok(rest.clone())),
            rest_config: None,
            query,
            rest: OnceCell::new(),
        }
    }
}

impl<R: RestClient> KrakenConnector<R> {
    pub fn is_transport_initialized(&self) -> bool {
        self.rest.initialized()
    }

    async fn rest(&self) -> Result<&KrakenRest<R>, ExchangeError> {
        self.rest
            .get_or_try_init(|| async { (self.connect)().map(KrakenRest::new) })
            .await
    }
}

impl<R: RestClient> std::fmt::Debug for KrakenConnector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenConnector")
            .field("rest_config", &self.rest_config)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: RestClient> ExchangeApi for KrakenConnector<R> {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Kraken
    }

    #[instrument(skip(self), fields(exchange = "kraken"))]
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ExchangeError> {
        let rest = self.rest().await?;
        let form = history_query_to_form(&self.query);
        let form_refs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = rest.get_trades_history_raw(&form_refs).await?;

        let history = decode_trades_history(&body)?;
        // TradesHistory serves 50 trades per call; `count` is the full total
        if let Some(count) = history
            .count
            .filter(|count| *count > history.trades.len() as u64)
        {
            warn!(
                returned = history.trades.len(),
                count, "Kraken returned a partial history; narrow the query bounds to fetch the rest"
            );
        }

        let transactions = history
            .trades
            .into_iter()
            .map(|(id, trade)| {
                convert_kraken_trade(id, trade).map_err(|e| ExchangeError::decode(&body, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // No server-side market filter on this endpoint
        if self.query.markets.is_empty() {
            return Ok(transactions);
        }
        let total = transactions.len();
        let filtered: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| self.query.markets.contains(tx.market()))
            .collect();
        debug!(
            kept = filtered.len(),
            total, "Filtered Kraken trades by market"
        );
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Symbol;

    #[derive(Debug, Clone)]
    struct CannedRest {
        body: &'static str,
    }

    #[async_trait]
    impl RestClient for CannedRest {
        async fn get(
            &self,
            _endpoint: &str,
            _query_params: &[(&str, &str)],
            _authenticated: bool,
        ) -> Result<String, ExchangeError> {
            Err(ExchangeError::network("Kraken history is fetched with POST"))
        }

        async fn post_form(
            &self,
            _endpoint: &str,
            _form: &[(&str, &str)],
            _authenticated: bool,
        ) -> Result<String, ExchangeError> {
            Ok(self.body.to_string())
        }
    }

    const HISTORY: &str = r#"{"error":[],"result":{"trades":{
        "T1":{"ordertxid":"O1","pair":"XTZUSD","time":1688667796.5,"type":"buy","price":"0.8","cost":"8","fee":"0.02","vol":"10"},
        "T2":{"ordertxid":"O2","pair":"XXBTZEUR","time":1688667797.0,"type":"sell","price":"28000","cost":"280","fee":"0.7","vol":"0.01"}
    },"count":120}}"#;

    #[tokio::test]
    async fn test_fetch_with_injected_transport() {
        let connector =
            KrakenConnector::with_rest(CannedRest { body: HISTORY }, HistoryQuery::default());
        assert!(!connector.is_transport_initialized());

        let transactions = connector.fetch_transactions().await.unwrap();

        assert!(connector.is_transport_initialized());
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].market(), &Symbol::new("XTZ", "USD").unwrap());
        assert_eq!(transactions[1].market(), &Symbol::new("BTC", "EUR").unwrap());
    }

    #[tokio::test]
    async fn test_market_filter_with_injected_transport() {
        let query = HistoryQuery::default().with_market(Symbol::new("BTC", "EUR").unwrap());
        let connector = KrakenConnector::with_rest(CannedRest { body: HISTORY }, query);

        let transactions = connector.fetch_transactions().await.unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id(), "T2");
    }
}
