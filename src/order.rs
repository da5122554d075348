//! Order shaping: market by default, limit-at-depth for thin instruments.

use evenlot_broker::Brokerage;
use evenlot_broker::types::{OrderRequest, OrderStyle, Product, QuoteId, TradeType};
use log::debug;

use crate::allocation::{AllocationPlan, AllocationRecord};
use crate::error::{Error, Result};

/// Symbols whose books are thin enough that a market order walks several
/// levels. These are priced as limits from book depth instead.
pub const DEPTH_PRICED_SYMBOLS: [&str; 2] = ["SGBMAY29", "SGBJUN30"];

/// Zero-indexed depth level used for limit pricing (the fifth level).
const DEPTH_LEVEL: usize = 4;

/// Whether a symbol takes a limit order priced from book depth.
pub fn is_depth_priced(symbol: &str) -> bool {
    DEPTH_PRICED_SYMBOLS.contains(&symbol)
}

/// Parse a trade type from its wire spelling.
///
/// Anything other than `BUY` or `SELL` fails with
/// [`Error::InvalidTradeType`].
pub fn parse_trade_type(value: &str) -> Result<TradeType> {
    match value {
        "BUY" => Ok(TradeType::Buy),
        "SELL" => Ok(TradeType::Sell),
        other => Err(Error::InvalidTradeType(other.to_string())),
    }
}

/// Shapes allocation records into executable orders.
pub struct OrderBuilder<'a> {
    broker: &'a dyn Brokerage,
    exchange: &'a str,
}

impl<'a> OrderBuilder<'a> {
    pub fn new(broker: &'a dyn Brokerage, exchange: &'a str) -> Self {
        Self { broker, exchange }
    }

    /// Build one order from an allocation record.
    ///
    /// BUY sizes from the record's buy quantity, SELL from its sell
    /// quantity. Depth-priced symbols get a limit at the fifth level of
    /// the opposite book side, fetched fresh at build time; everything
    /// else is a market order with no price.
    pub fn build(&self, record: &AllocationRecord, trade_type: TradeType) -> Result<OrderRequest> {
        let quantity = match trade_type {
            TradeType::Buy => record.buy_quantity,
            TradeType::Sell => record.sell_quantity,
        };
        let quantity = u64::try_from(quantity)
            .map_err(|_| Error::Order(format!("negative quantity for {}", record.symbol)))?;

        let (order_type, price) = if is_depth_priced(&record.symbol) {
            let price = self.depth_price(&record.quote_id, trade_type)?;
            (OrderStyle::Limit, Some(price))
        } else {
            (OrderStyle::Market, None)
        };

        Ok(OrderRequest {
            tradingsymbol: record.symbol.clone(),
            exchange: self.exchange.to_string(),
            quantity,
            transaction_type: trade_type,
            order_type,
            price,
            product: Product::Cnc,
        })
    }

    /// One BUY order per record with a positive buy quantity, in record
    /// order.
    pub fn build_buy_orders(&self, plan: &AllocationPlan) -> Result<Vec<OrderRequest>> {
        let mut orders = Vec::new();
        for record in plan.records() {
            if record.buy_quantity > 0 {
                orders.push(self.build(record, TradeType::Buy)?);
            }
        }
        Ok(orders)
    }

    /// Fifth price level on the side the order trades against: buys are
    /// priced from resting sells, sells from resting buys.
    fn depth_price(&self, quote_id: &QuoteId, trade_type: TradeType) -> Result<f64> {
        let depth = self
            .broker
            .depth(std::slice::from_ref(quote_id))
            .map_err(|e| Error::Fetch(format!("depth lookup for {quote_id} failed: {e}")))?;
        let book = depth
            .get(quote_id.as_str())
            .ok_or_else(|| Error::Order(format!("no depth returned for {quote_id}")))?;

        let levels = match trade_type {
            TradeType::Buy => &book.sell,
            TradeType::Sell => &book.buy,
        };
        let level = levels.get(DEPTH_LEVEL).ok_or_else(|| {
            Error::Order(format!(
                "depth for {quote_id} has fewer than {} levels",
                DEPTH_LEVEL + 1
            ))
        })?;

        debug!(
            "{quote_id}: limit price {:.2} from depth level {DEPTH_LEVEL}",
            level.price
        );
        Ok(level.price)
    }
}

/// Build a five-level book side for tests.
#[cfg(test)]
fn ladder(start: f64, step: f64, levels: usize) -> Vec<evenlot_broker::types::DepthLevel> {
    (0..levels)
        .map(|i| evenlot_broker::types::DepthLevel {
            price: start + step * i as f64,
            quantity: 10,
            orders: 1,
        })
        .collect()
}
