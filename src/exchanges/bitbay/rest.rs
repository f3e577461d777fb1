use crate::core::errors::{ExchangeError, ReportedError};
use crate::core::kernel::RestClient;
use crate::core::types::ExchangeId;
use crate::exchanges::bitbay::types::{
    BitbayHistoryQuery, BitbayPage, BitbayResponse, BitbayTransaction,
};
use serde::de::DeserializeOwned;

pub const TRANSACTIONS_ENDPOINT: &str = "/rest/trading/history/transactions";

/// Codes BitBay reports in `errors` when `status` is `Fail`
pub const BITBAY_ERROR_CODES: &[(&str, &str)] = &[
    ("PERMISSIONS_NOT_SUFFICIENT", "API key permissions do not allow this action"),
    ("INVALID_HASH_SIGNATURE", "API-Hash signature does not match the request"),
    ("INVALID_PUBLIC_KEY", "API-Key is malformed or unknown"),
    ("INVALID_REQUEST_TIMESTAMP", "Request-Timestamp header is missing or out of range"),
    ("INVALID_OPERATION_ID", "operation-id header is missing or malformed"),
    ("ACTION_BLOCKED", "Action is blocked on this account"),
    ("ACTION_LIMIT_EXCEEDED", "Too many requests; rate limit exceeded"),
    ("UNDER_MAINTENANCE", "Exchange is under maintenance"),
    ("TIMEOUT", "Request timed out on the exchange side"),
    ("RESPONSE_TIMEOUT", "Exchange did not respond in time"),
    ("FUNDS_NOT_SUFFICIENT", "Insufficient funds"),
    ("MARKET_CODE_INVALID", "Unknown market in query"),
];

/// BitBay REST API client implementation
#[derive(Debug)]
pub struct BitbayRest<R: RestClient> {
    rest_client: R,
}

impl<R: RestClient> BitbayRest<R> {
    pub fn new(rest_client: R) -> Self {
        Self { rest_client }
    }

    /// Fetch one page of transaction history and return the raw body.
    ///
    /// The filter is JSON-encoded into the single `query` parameter.
    pub async fn get_transactions_raw(
        &self,
        query: &BitbayHistoryQuery,
    ) -> Result<String, ExchangeError> {
        let query_json = serde_json::to_string(query).map_err(|e| {
            ExchangeError::SerializationError(format!("Failed to encode history query: {}", e))
        })?;

        self.rest_client
            .get(TRANSACTIONS_ENDPOINT, &[("query", query_json.as_str())], true)
            .await
    }
}

/// Decode a 2xx body and classify it as a page of items, a malformed
/// payload, or a failure reported by BitBay.
pub fn handle_response<T>(body: &str) -> Result<BitbayPage<T>, ExchangeError>
where
    T: DeserializeOwned,
{
    let response: BitbayResponse<T> =
        serde_json::from_str(body).map_err(|e| ExchangeError::decode(body, e))?;

    match response {
        BitbayResponse::Ok(page) => Ok(page),
        BitbayResponse::Fail { errors } => Err(map_bitbay_errors(errors)),
    }
}

pub fn decode_transactions(
    body: &str,
) -> Result<BitbayPage<BitbayTransaction>, ExchangeError> {
    handle_response(body)
}

fn map_bitbay_errors(codes: Vec<String>) -> ExchangeError {
    ExchangeError::Business {
        exchange: ExchangeId::Bitbay,
        errors: codes
            .into_iter()
            .map(|code| ReportedError::lookup(code, BITBAY_ERROR_CODES))
            .collect(),
    }
}
