use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Typed errors for the types subsystem
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(#[from] rust_decimal::Error),
    #[error("Invalid side: {0}")]
    InvalidSide(String),
}

/// Exchanges this crate can fetch history from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Bitbay,
    Kraken,
}

impl ExchangeId {
    pub const ALL: [Self; 2] = [Self::Bitbay, Self::Kraken];

    /// Lowercase name used in logs and as the environment prefix
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bitbay => "bitbay",
            Self::Kraken => "kraken",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitbay => write!(f, "BitBay"),
            Self::Kraken => write!(f, "Kraken"),
        }
    }
}

/// Type-safe market representation with validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    /// Create a new symbol with validation
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Result<Self, TypesError> {
        let base = base.into();
        let quote = quote.into();

        if base.is_empty() || quote.is_empty() {
            return Err(TypesError::InvalidSymbol(
                "Base and quote assets cannot be empty".to_string(),
            ));
        }

        Ok(Self { base, quote })
    }

    /// Parse a market written as `BASE<sep>QUOTE`, e.g. `BTC-PLN`
    pub fn split(market: &str, separator: char) -> Result<Self, TypesError> {
        market
            .split_once(separator)
            .ok_or_else(|| TypesError::InvalidSymbol(market.to_string()))
            .and_then(|(base, quote)| Self::new(base, quote))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Type-safe price representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn parse(s: &str) -> Result<Self, TypesError> {
        Ok(Self(s.parse()?))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe quantity representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn parse(s: &str) -> Result<Self, TypesError> {
        Ok(Self(s.parse()?))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Case-insensitive `buy` / `sell`
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Self::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Self::Sell)
        } else {
            Err(TypesError::InvalidSide(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Decimal,
    /// Currency the fee was charged in, when the exchange reports it
    pub currency: Option<String>,
}

/// One executed trade, normalized across exchanges.
///
/// Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    exchange: ExchangeId,
    timestamp: DateTime<Utc>,
    market: Symbol,
    side: Side,
    amount: Quantity,
    rate: Price,
    fee: Option<Fee>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        exchange: ExchangeId,
        timestamp: DateTime<Utc>,
        market: Symbol,
        side: Side,
        amount: Quantity,
        rate: Price,
        fee: Option<Fee>,
    ) -> Self {
        Self {
            id: id.into(),
            exchange,
            timestamp,
            market,
            side,
            amount,
            rate,
            fee,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn exchange(&self) -> ExchangeId {
        self.exchange
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn market(&self) -> &Symbol {
        &self.market
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Traded amount in the base currency
    pub fn amount(&self) -> Quantity {
        self.amount
    }

    /// Price in quote currency per unit of base
    pub fn rate(&self) -> Price {
        self.rate
    }

    pub fn fee(&self) -> Option<&Fee> {
        self.fee.as_ref()
    }

    /// Value of the trade in the quote currency
    pub fn total(&self) -> Decimal {
        self.amount.value() * self.rate.value()
    }
}

/// Server-side filter for history requests.
///
/// The default requests the full, unfiltered history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Markets to restrict to; empty means all markets
    pub markets: Vec<Symbol>,
    /// Page size; `None` asks for the exchange maximum
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub fn full_history() -> Self {
        Self::default()
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_market(mut self, market: Symbol) -> Self {
        self.markets.push(market);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbol_split() {
        let symbol = Symbol::split("BTC-PLN", '-').unwrap();
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "PLN");
        assert_eq!(symbol.to_string(), "BTC/PLN");
        assert!(Symbol::split("BTCPLN", '-').is_err());
        assert!(Symbol::split("-PLN", '-').is_err());
    }

    #[test]
    fn test_decimal_parse_errors_are_typed() {
        assert!(matches!(
            Price::parse("12,5"),
            Err(TypesError::InvalidDecimal(_))
        ));
        assert_eq!(Quantity::parse("0.25").unwrap().value(), dec!(0.25));
    }

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("Buy").unwrap(), Side::Buy);
        assert_eq!(Side::parse("sell").unwrap(), Side::Sell);
        assert!(Side::parse("hold").is_err());
    }

    #[test]
    fn test_transaction_total() {
        let tx = Transaction::new(
            "1",
            ExchangeId::Bitbay,
            Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap(),
            Symbol::new("BTC", "PLN").unwrap(),
            Side::Buy,
            Quantity::new(dec!(0.5)),
            Price::new(dec!(200000)),
            None,
        );
        assert_eq!(tx.total(), dec!(100000));
        assert_eq!(tx.exchange().as_str(), "bitbay");
    }

    #[test]
    fn test_transaction_serializes_decimals_as_strings() {
        let tx = Transaction::new(
            "abc",
            ExchangeId::Kraken,
            Utc.with_ymd_and_hms(2023, 7, 6, 18, 23, 16).unwrap(),
            Symbol::new("XBT", "USD").unwrap(),
            Side::Sell,
            Quantity::new(dec!(0.02)),
            Price::new(dec!(30010.5)),
            Some(Fee {
                amount: dec!(1.2),
                currency: Some("USD".to_string()),
            }),
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["amount"], "0.02");
        assert_eq!(json["rate"], "30010.5");
        assert_eq!(json["exchange"], "kraken");
    }
}
