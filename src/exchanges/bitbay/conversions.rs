use super::types as bitbay_types;
use crate::core::config::CodecConfig;
use crate::core::types::{
    ExchangeId, Fee, HistoryQuery, Price, Quantity, Side, Symbol, Transaction,
};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Largest page the history endpoint serves
pub const MAX_PAGE_SIZE: u32 = 300;

/// Convert a BitBay transaction to a core transaction
pub fn convert_bitbay_transaction(
    tx: bitbay_types::BitbayTransaction,
    codec: &CodecConfig,
) -> Result<Transaction, String> {
    let market = Symbol::split(&tx.market, '-')
        .map_err(|e| format!("transaction {}: {}", tx.id, e))?;
    let side = Side::parse(&tx.user_action)
        .map_err(|e| format!("transaction {}: {}", tx.id, e))?;
    let timestamp = parse_time(&tx.time, codec)
        .map_err(|e| format!("transaction {}: {}", tx.id, e))?;

    let fee = tx.commission_value.map(|amount| Fee {
        amount,
        currency: None,
    });

    Ok(Transaction::new(
        tx.id,
        ExchangeId::Bitbay,
        timestamp,
        market,
        side,
        Quantity::new(tx.amount),
        Price::new(tx.rate),
        fee,
    ))
}

/// Epoch milliseconds, or a textual date in the configured format (UTC)
fn parse_time(time: &str, codec: &CodecConfig) -> Result<DateTime<Utc>, String> {
    if !time.is_empty() && time.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = time
            .parse()
            .map_err(|e| format!("invalid timestamp {}: {}", time, e))?;
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| format!("timestamp out of range: {}", time));
    }

    NaiveDateTime::parse_from_str(time, &codec.date_format)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            format!(
                "invalid timestamp {} for format {}: {}",
                time, codec.date_format, e
            )
        })
}

/// Build the wire filter for a history query
pub fn history_query_to_bitbay(query: &HistoryQuery) -> bitbay_types::BitbayHistoryQuery {
    bitbay_types::BitbayHistoryQuery {
        markets: query
            .markets
            .iter()
            .map(|m| format!("{}-{}", m.base, m.quote))
            .collect(),
        user_action: None,
        from_time: query.from.map(|t| t.timestamp_millis().to_string()),
        to_time: query.to.map(|t| t.timestamp_millis().to_string()),
        limit: query
            .limit
            .unwrap_or(MAX_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
            .to_string(),
    }
}
