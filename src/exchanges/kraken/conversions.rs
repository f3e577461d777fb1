use super::types as kraken_types;
use crate::core::types::{
    ExchangeId, Fee, HistoryQuery, Price, Quantity, Side, Symbol, Transaction,
};
use chrono::{DateTime, Utc};

/// X/Z-prefixed asset codes used by Kraken's legacy eight-character pairs
const LEGACY_ASSETS: &[(&str, &str)] = &[
    ("XXBT", "BTC"),
    ("XETH", "ETH"),
    ("XXRP", "XRP"),
    ("XLTC", "LTC"),
    ("XXLM", "XLM"),
    ("XXMR", "XMR"),
    ("XZEC", "ZEC"),
    ("XETC", "ETC"),
    ("XREP", "REP"),
    ("XMLN", "MLN"),
    ("XXDG", "DOGE"),
    ("ZUSD", "USD"),
    ("ZEUR", "EUR"),
    ("ZGBP", "GBP"),
    ("ZCAD", "CAD"),
    ("ZJPY", "JPY"),
    ("ZAUD", "AUD"),
];

/// Quote codes recognised at the end of a modern pair name, longest first
/// so `USDT` wins over `USD`
const QUOTE_SUFFIXES: &[&str] = &[
    "USDT", "USDC", "USD", "EUR", "GBP", "CAD", "JPY", "CHF", "AUD", "XBT", "ETH", "DAI",
];

/// Kraken spellings of tickers that differ from the common ones
const ASSET_ALIASES: &[(&str, &str)] = &[("XBT", "BTC"), ("XDG", "DOGE")];

fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, ticker)| *ticker)
}

fn normalize_asset(asset: &str) -> String {
    lookup(ASSET_ALIASES, asset).map_or_else(|| asset.to_string(), str::to_string)
}

/// Split a Kraken pair name such as `XXBTZUSD`, `XTZUSD` or `XBTUSDT`
pub fn parse_pair(pair: &str) -> Result<Symbol, String> {
    if pair.len() == 8 && pair.is_char_boundary(4) {
        let (base, quote) = pair.split_at(4);
        if let (Some(base), Some(quote)) =
            (lookup(LEGACY_ASSETS, base), lookup(LEGACY_ASSETS, quote))
        {
            return Symbol::new(base, quote).map_err(|e| e.to_string());
        }
    }

    QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            pair.strip_suffix(suffix)
                .filter(|base| !base.is_empty())
                .map(|base| (base, *suffix))
        })
        .ok_or_else(|| format!("unrecognised pair {}", pair))
        .and_then(|(base, quote)| {
            Symbol::new(normalize_asset(base), normalize_asset(quote)).map_err(|e| e.to_string())
        })
}

/// Convert a Kraken trade to a core transaction
pub fn convert_kraken_trade(
    trade_id: String,
    trade: kraken_types::KrakenTrade,
) -> Result<Transaction, String> {
    let market = parse_pair(&trade.pair).map_err(|e| format!("trade {}: {}", trade_id, e))?;
    let side = Side::parse(&trade.side).map_err(|e| format!("trade {}: {}", trade_id, e))?;

    let millis = (trade.time * 1000.0).round() as i64;
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("trade {}: time out of range: {}", trade_id, trade.time))?;

    // Kraken charges trade fees in the quote currency
    let fee = Fee {
        amount: trade.fee,
        currency: Some(market.quote.clone()),
    };

    Ok(Transaction::new(
        trade_id,
        ExchangeId::Kraken,
        timestamp,
        market,
        side,
        Quantity::new(trade.vol),
        Price::new(trade.price),
        Some(fee),
    ))
}

/// Form fields for a history query. Kraken cannot filter by market or
/// page size server-side.
pub fn history_query_to_form(query: &HistoryQuery) -> Vec<(&'static str, String)> {
    let mut form = vec![("type", "all".to_string()), ("trades", "false".to_string())];
    if let Some(from) = query.from {
        form.push(("start", from.timestamp().to_string()));
    }
    if let Some(to) = query.to {
        form.push(("end", to.timestamp().to_string()));
    }
    form
}
