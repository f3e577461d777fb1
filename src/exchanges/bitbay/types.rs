use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Filter payload sent as the `query` parameter of the history endpoint
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BitbayHistoryQuery {
    pub markets: Vec<String>, // e.g. BTC-PLN; empty means all markets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_action: Option<String>, // Buy or Sell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_time: Option<String>, // epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_time: Option<String>, // epoch milliseconds
    pub limit: String,
}

/// Response envelope, discriminated by its `status` field
#[derive(Debug, Deserialize)]
#[serde(tag = "status")]
pub enum BitbayResponse<T> {
    Ok(BitbayPage<T>),
    Fail {
        #[serde(default)]
        errors: Vec<String>,
    },
}

/// Successful history page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbayPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total_rows: Option<String>,
    pub next_page_cursor: Option<String>,
}

impl<T> BitbayPage<T> {
    /// Rows matching the query on the server, which can exceed the page
    pub fn reported_total(&self) -> Option<usize> {
        self.total_rows.as_deref().and_then(|rows| rows.parse().ok())
    }
}

/// One executed transaction from `/trading/history/transactions`
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BitbayTransaction {
    pub id: String,
    pub market: String,           // BASE-QUOTE, e.g. BTC-PLN
    pub time: String,             // epoch milliseconds as a string
    pub amount: Decimal,          // in base currency
    pub rate: Decimal,            // quote per base
    pub user_action: String,      // Buy or Sell, from the account owner's side
    pub initialized_by: Option<String>,
    pub was_taker: Option<bool>,
    pub offer_id: Option<String>,
    pub commission_value: Option<Decimal>,
}
