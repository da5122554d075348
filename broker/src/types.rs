//! Shared broker types: quote addressing, holdings, positions, quotes,
//! orders, margins.

use serde::Deserialize;

/// Exchange-qualified quote address (`NSE:INFY`) used to request price and
/// depth records.
///
/// Derived deterministically from an exchange code and a trading symbol;
/// construction is pure and total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteId(String);

impl QuoteId {
    pub fn new(exchange: &str, tradingsymbol: &str) -> Self {
        Self(format!("{exchange}:{tradingsymbol}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One holding as reported by the brokerage (opening state for the day).
#[derive(Debug, Clone, Deserialize)]
pub struct HoldingEntry {
    pub tradingsymbol: String,
    pub exchange: String,
    /// Opaque broker token for the instrument.
    pub instrument_token: u64,
    pub quantity: i64,
    #[serde(default)]
    pub average_price: f64,
}

/// One entry of a positions list: net traded quantity for a symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionEntry {
    pub tradingsymbol: String,
    /// Signed net quantity. Positive = net bought, negative = net sold.
    pub quantity: i64,
}

/// Last-traded-price record for one quote id.
#[derive(Debug, Clone, Deserialize)]
pub struct LtpQuote {
    pub instrument_token: u64,
    pub last_price: f64,
}

/// One resting price level of an order book.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthLevel {
    pub price: f64,
    pub quantity: i64,
    pub orders: i64,
}

/// Ranked resting levels for one instrument, best price first.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDepth {
    pub buy: Vec<DepthLevel>,
    pub sell: Vec<DepthLevel>,
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market or limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStyle {
    Market,
    Limit,
}

impl OrderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStyle::Market => "MARKET",
            OrderStyle::Limit => "LIMIT",
        }
    }
}

/// Product type. CNC is delivery: full upfront payment, no intraday
/// leverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Cnc,
}

impl Product {
    pub fn as_str(self) -> &'static str {
        match self {
            Product::Cnc => "CNC",
        }
    }
}

/// Order routing variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variety {
    Regular,
}

impl Variety {
    pub fn as_str(self) -> &'static str {
        match self {
            Variety::Regular => "regular",
        }
    }
}

/// Order to submit to the brokerage. Immutable once built.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub tradingsymbol: String,
    pub exchange: String,
    pub quantity: u64,
    pub transaction_type: TradeType,
    pub order_type: OrderStyle,
    /// Present only for limit orders.
    pub price: Option<f64>,
    pub product: Product,
}

/// Broker confirmation for an accepted order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
}

/// Margin segment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Equity,
    Commodity,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Equity => "equity",
            Segment::Commodity => "commodity",
        }
    }
}

/// Cash balances available inside a margin segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableMargins {
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub live_balance: f64,
    #[serde(default)]
    pub collateral: f64,
}

/// Margins for one trading segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentMargins {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub net: f64,
    #[serde(default)]
    pub available: AvailableMargins,
}

/// Margin summary across segments. Segments the caller did not request
/// (or the account does not carry) are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarginSummary {
    pub equity: Option<SegmentMargins>,
    pub commodity: Option<SegmentMargins>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_id_format() {
        let id = QuoteId::new("NSE", "INFY");
        assert_eq!(id.as_str(), "NSE:INFY");
        assert_eq!(format!("{id}"), "NSE:INFY");
    }

    #[test]
    fn wire_spellings() {
        assert_eq!(TradeType::Buy.as_str(), "BUY");
        assert_eq!(TradeType::Sell.as_str(), "SELL");
        assert_eq!(OrderStyle::Market.as_str(), "MARKET");
        assert_eq!(OrderStyle::Limit.as_str(), "LIMIT");
        assert_eq!(Product::Cnc.as_str(), "CNC");
        assert_eq!(Variety::Regular.as_str(), "regular");
        assert_eq!(Segment::Equity.as_str(), "equity");
    }
}
