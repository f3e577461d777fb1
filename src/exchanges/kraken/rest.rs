use crate::core::errors::{ExchangeError, ReportedError};
use crate::core::kernel::RestClient;
use crate::core::types::ExchangeId;
use crate::exchanges::kraken::types::{KrakenResponse, KrakenTradesHistory};
use serde::de::DeserializeOwned;
use tracing::warn;

pub const TRADES_HISTORY_ENDPOINT: &str = "/0/private/TradesHistory";

/// Messages Kraken reports in the `error` array
pub const KRAKEN_ERROR_CODES: &[(&str, &str)] = &[
    ("EAPI:Invalid key", "API key is unknown or has been revoked"),
    ("EAPI:Invalid signature", "API-Sign does not match the request"),
    ("EAPI:Invalid nonce", "Nonce is not greater than the previous one"),
    ("EAPI:Rate limit exceeded", "Too many requests; rate limit exceeded"),
    ("EGeneral:Permission denied", "API key lacks the permission to query trades"),
    ("EGeneral:Invalid arguments", "Request parameters were rejected"),
    ("EGeneral:Temporary lockout", "Account temporarily locked after repeated failures"),
    ("EService:Unavailable", "Exchange is unavailable"),
    ("EService:Busy", "Exchange is busy"),
];

/// Kraken REST API client implementation
#[derive(Debug)]
pub struct KrakenRest<R: RestClient> {
    rest_client: R,
}

impl<R: RestClient> KrakenRest<R> {
    pub fn new(rest_client: R) -> Self {
        Self { rest_client }
    }

    /// Fetch trade history and return the raw body
    pub async fn get_trades_history_raw(
        &self,
        form: &[(&str, &str)],
    ) -> Result<String, ExchangeError> {
        self.rest_client
            .post_form(TRADES_HISTORY_ENDPOINT, form, true)
            .await
    }
}

/// Decode a 2xx body and classify it.
///
/// Entries starting with `E` are errors; anything else in the `error`
/// array (Kraken uses `W` for warnings) is logged and ignored.
pub fn handle_response<T>(body: &str) -> Result<T, ExchangeError>
where
    T: DeserializeOwned,
{
    let response: KrakenResponse<T> =
        serde_json::from_str(body).map_err(|e| ExchangeError::decode(body, e))?;

    let (errors, warnings): (Vec<String>, Vec<String>) = response
        .error
        .into_iter()
        .partition(|message| message.starts_with('E'));

    for warning in &warnings {
        warn!(exchange = "kraken", "Kraken warning: {}", warning);
    }

    if !errors.is_empty() {
        return Err(map_kraken_errors(errors));
    }

    response
        .result
        .ok_or_else(|| ExchangeError::decode(body, "missing `result` in successful response"))
}

pub fn decode_trades_history(body: &str) -> Result<KrakenTradesHistory, ExchangeError> {
    handle_response(body)
}

fn map_kraken_errors(messages: Vec<String>) -> ExchangeError {
    ExchangeError::Business {
        exchange: ExchangeId::Kraken,
        errors: messages
            .into_iter()
            .map(|message| ReportedError::lookup(message, KRAKEN_ERROR_CODES))
            .collect(),
    }
}
