use rust_decimal::Decimal;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kraken API standard response wrapper
///
/// Failures arrive with HTTP 200 and a non-empty `error` array.
#[derive(Debug, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// Result of `/0/private/TradesHistory`
#[derive(Debug, Deserialize)]
pub struct KrakenTradesHistory {
    /// Trades keyed by trade id, kept in response order
    #[serde(default, deserialize_with = "ordered_trades")]
    pub trades: Vec<(String, KrakenTrade)>,
    pub count: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KrakenTrade {
    pub ordertxid: String,
    pub postxid: Option<String>,
    pub pair: String, // e.g. XXBTZUSD
    pub time: f64,    // unix seconds with fraction
    #[serde(rename = "type")]
    pub side: String, // buy or sell
    pub ordertype: Option<String>,
    pub price: Decimal,
    pub cost: Decimal,
    pub fee: Decimal, // in quote currency
    pub vol: Decimal,
    pub margin: Option<Decimal>,
    pub misc: Option<String>,
}

fn ordered_trades<'de, D>(deserializer: D) -> Result<Vec<(String, KrakenTrade)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TradesVisitor;

    impl<'de> Visitor<'de> for TradesVisitor {
        type Value = Vec<(String, KrakenTrade)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of trade id to trade")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut trades = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                trades.push(entry);
            }
            Ok(trades)
        }
    }

    deserializer.deserialize_map(TradesVisitor)
}
