//! Mock brokerage for testing — implements [`Brokerage`] with configurable
//! holdings, prices, depth, and per-symbol order failures.
//!
//! ```ignore
//! use evenlot_broker::mock::MockBrokerage;
//! use evenlot_broker::types::QuoteId;
//!
//! let broker = MockBrokerage::builder()
//!     .with_holding("INFY", 10, 95.0)
//!     .with_ltp(&QuoteId::new("NSE", "INFY"), 100.0)
//!     .build();
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::Brokerage;
use crate::error::BrokerError;
use crate::types::{
    AvailableMargins, HoldingEntry, LtpQuote, MarginSummary, MarketDepth, OrderReceipt,
    OrderRequest, PositionEntry, QuoteId, Segment, SegmentMargins, Variety,
};

/// Builder for [`MockBrokerage`].
pub struct MockBrokerageBuilder {
    holdings: Vec<HoldingEntry>,
    day_positions: Vec<PositionEntry>,
    quotes: HashMap<String, LtpQuote>,
    depth: HashMap<String, MarketDepth>,
    failing_symbols: HashSet<String>,
    equity_cash: f64,
    next_token: u64,
}

impl MockBrokerageBuilder {
    pub fn with_holding(mut self, tradingsymbol: &str, quantity: i64, average_price: f64) -> Self {
        self.next_token += 1;
        self.holdings.push(HoldingEntry {
            tradingsymbol: tradingsymbol.to_string(),
            exchange: "NSE".to_string(),
            instrument_token: self.next_token,
            quantity,
            average_price,
        });
        self
    }

    pub fn with_day_position(mut self, tradingsymbol: &str, quantity: i64) -> Self {
        self.day_positions.push(PositionEntry {
            tradingsymbol: tradingsymbol.to_string(),
            quantity,
        });
        self
    }

    pub fn with_ltp(mut self, quote_id: &QuoteId, last_price: f64) -> Self {
        let token = self.next_token;
        self.quotes.insert(
            quote_id.as_str().to_string(),
            LtpQuote {
                instrument_token: token,
                last_price,
            },
        );
        self
    }

    pub fn with_depth(mut self, quote_id: &QuoteId, depth: MarketDepth) -> Self {
        self.depth.insert(quote_id.as_str().to_string(), depth);
        self
    }

    /// Orders for this symbol are rejected by `place_order`.
    pub fn failing_symbol(mut self, tradingsymbol: &str) -> Self {
        self.failing_symbols.insert(tradingsymbol.to_string());
        self
    }

    pub fn with_equity_cash(mut self, cash: f64) -> Self {
        self.equity_cash = cash;
        self
    }

    pub fn build(self) -> MockBrokerage {
        MockBrokerage {
            holdings: self.holdings,
            day_positions: self.day_positions,
            quotes: self.quotes,
            depth: self.depth,
            failing_symbols: self.failing_symbols,
            equity_cash: self.equity_cash,
            placed: Mutex::new(Vec::new()),
        }
    }
}

/// A mock brokerage that records every submitted order.
pub struct MockBrokerage {
    holdings: Vec<HoldingEntry>,
    day_positions: Vec<PositionEntry>,
    quotes: HashMap<String, LtpQuote>,
    depth: HashMap<String, MarketDepth>,
    failing_symbols: HashSet<String>,
    equity_cash: f64,
    placed: Mutex<Vec<OrderRequest>>,
}

impl MockBrokerage {
    pub fn builder() -> MockBrokerageBuilder {
        MockBrokerageBuilder {
            holdings: Vec::new(),
            day_positions: Vec::new(),
            quotes: HashMap::new(),
            depth: HashMap::new(),
            failing_symbols: HashSet::new(),
            equity_cash: 100_000.0,
            next_token: 0,
        }
    }

    /// Orders submitted so far, in submission order. Rejected orders are
    /// recorded too: submission happened, acceptance did not.
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }
}

impl Brokerage for MockBrokerage {
    fn holdings(&self) -> Result<Vec<HoldingEntry>, BrokerError> {
        Ok(self.holdings.clone())
    }

    fn day_positions(&self) -> Result<Vec<PositionEntry>, BrokerError> {
        Ok(self.day_positions.clone())
    }

    fn ltp(&self, quotes: &[QuoteId]) -> Result<HashMap<String, LtpQuote>, BrokerError> {
        Ok(quotes
            .iter()
            .filter_map(|q| {
                self.quotes
                    .get(q.as_str())
                    .map(|quote| (q.as_str().to_string(), quote.clone()))
            })
            .collect())
    }

    fn depth(&self, quotes: &[QuoteId]) -> Result<HashMap<String, MarketDepth>, BrokerError> {
        Ok(quotes
            .iter()
            .filter_map(|q| {
                self.depth
                    .get(q.as_str())
                    .map(|d| (q.as_str().to_string(), d.clone()))
            })
            .collect())
    }

    fn place_order(
        &self,
        _variety: Variety,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, BrokerError> {
        let mut placed = self.placed.lock().unwrap();
        placed.push(order.clone());

        if self.failing_symbols.contains(&order.tradingsymbol) {
            return Err(BrokerError::Order(format!(
                "mock: order rejected for {}",
                order.tradingsymbol
            )));
        }

        Ok(OrderReceipt {
            order_id: format!("mock-{}", placed.len()),
        })
    }

    fn margins(&self, segment: Option<Segment>) -> Result<MarginSummary, BrokerError> {
        let equity = SegmentMargins {
            enabled: true,
            net: self.equity_cash,
            available: AvailableMargins {
                cash: self.equity_cash,
                live_balance: self.equity_cash,
                collateral: 0.0,
            },
        };
        Ok(match segment {
            None | Some(Segment::Equity) => MarginSummary {
                equity: Some(equity),
                commodity: None,
            },
            Some(Segment::Commodity) => MarginSummary {
                equity: None,
                commodity: None,
            },
        })
    }
}
