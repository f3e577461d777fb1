use crate::core::config::CodecConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
use crate::core::traits::ExchangeApi;
use crate::core::types::{ExchangeId, HistoryQuery, Transaction};
use crate::exchanges::bitbay::conversions::{convert_bitbay_transaction, history_query_to_bitbay};
use crate::exchanges::bitbay::rest::{decode_transactions, BitbayRest};
use crate::exchanges::bitbay::signer::BitbaySigner;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{instrument, warn};

type Connect<R> = Box<dyn Fn() -> Result<R, ExchangeError> + Send + Sync>;

/// BitBay trade history adapter
///
/// The transport is built on the first fetch and reused for the lifetime of
/// the connector.
pub struct BitbayConnector<R: RestClient = ReqwestRest> {
    connect: Connect<R>,
    rest_config: Option<RestClientConfig>,
    codec: CodecConfig,
    query: HistoryQuery,
    rest: OnceCell<BitbayRest<R>>,
}

impl BitbayConnector {
    pub fn new(
        signer: BitbaySigner,
        rest_config: RestClientConfig,
        codec: CodecConfig,
        query: HistoryQuery,
    ) -> Self {
        let signer = Arc::new(signer);
        let config = rest_config.clone();
        Self {
            connect: Box::new(move || {
                RestClientBuilder::new(config.clone())
                    .with_signer(signer.clone())
                    .build()
            }),
            rest_config: Some(rest_config),
            codec,
            query,
            rest: OnceCell::new(),
        }
    }
}

impl<R: RestClient + Clone + 'static> BitbayConnector<R> {
    /// Use a transport built elsewhere; it is responsible for signing
    pub fn with_rest(rest: R, codec: CodecConfig, query: HistoryQuery) -> Self {
        Self {
            connect: Box::new(move || Ok(rest.clone())),
            rest_config: None,
            codec,
            query,
            rest: OnceCell::new(),
        }
    }
}

impl<R: RestClient> BitbayConnector<R> {
    /// Whether the first fetch has built the transport yet
    pub fn is_transport_initialized(&self) -> bool {
        self.rest.initialized()
    }

    async fn rest(&self) -> Result<&BitbayRest<R>, ExchangeError> {
        self.rest
            .get_or_try_init(|| async { (self.connect)().map(BitbayRest::new) })
            .await
    }
}

impl<R: RestClient> std::fmt::Debug for BitbayConnector<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbayConnector")
            .field("rest_config", &self.rest_config)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: RestClient> ExchangeApi for BitbayConnector<R> {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitbay
    }

    #[instrument(skip(self), fields(exchange = "bitbay"))]
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ExchangeError> {
        let rest = self.rest().await?;
        let body = rest
            .get_transactions_raw(&history_query_to_bitbay(&self.query))
            .await?;

        let page = decode_transactions(&body)?;
        if let Some(total) = page.reported_total().filter(|total| *total > page.items.len()) {
            warn!(
                returned = page.items.len(),
                total, "BitBay returned a partial history; narrow the query bounds to fetch the rest"
            );
        }

        page.items
            .into_iter()
            .map(|tx| {
                convert_bitbay_transaction(tx, &self.codec)
                    .map_err(|e| ExchangeError::decode(&body, e))
            })
            .collect()
    }
}
