//! Holding aggregation: opening holdings merged with same-day position
//! deltas, priced at last traded price.

use std::collections::HashMap;

use evenlot_broker::types::{HoldingEntry, LtpQuote, PositionEntry, QuoteId};
use rustc_hash::FxHashMap;

/// One holding with its effective quantity for the day.
///
/// `quantity` is computed once at assembly and never mutated for the
/// remainder of the run.
#[derive(Debug, Clone)]
pub struct Holding {
    pub symbol: String,
    /// Opaque broker token for the instrument.
    pub instrument_token: u64,
    pub opening_quantity: i64,
    /// Net same-day traded quantity; 0 when the symbol saw no trade today.
    pub day_delta: i64,
    /// opening_quantity + day_delta.
    pub quantity: i64,
    /// Last traded price; 0.0 when the venue returned no quote.
    pub last_price: f64,
}

impl Holding {
    /// Current monetary value of this holding.
    pub fn current_value(&self) -> f64 {
        self.quantity as f64 * self.last_price
    }

    /// Quote id addressing this holding's price and depth records.
    pub fn quote_id(&self, exchange: &str) -> QuoteId {
        QuoteId::new(exchange, &self.symbol)
    }
}

/// Net day delta per symbol. Later entries for the same symbol overwrite
/// earlier ones.
pub fn day_deltas(positions: &[PositionEntry]) -> FxHashMap<String, i64> {
    let mut deltas = FxHashMap::default();
    for pos in positions {
        deltas.insert(pos.tradingsymbol.clone(), pos.quantity);
    }
    deltas
}

/// Merge opening holdings with day deltas and attach last traded prices.
///
/// Day positions without a matching holding are ignored. A missing quote
/// resolves to a price of 0.0; downstream sizing treats that as "cannot
/// buy" rather than an error.
pub fn assemble(
    entries: &[HoldingEntry],
    day_positions: &[PositionEntry],
    quotes: &HashMap<String, LtpQuote>,
    exchange: &str,
) -> Vec<Holding> {
    let deltas = day_deltas(day_positions);

    entries
        .iter()
        .map(|entry| {
            let day_delta = deltas.get(&entry.tradingsymbol).copied().unwrap_or(0);
            let quote_id = QuoteId::new(exchange, &entry.tradingsymbol);
            let last_price = quotes
                .get(quote_id.as_str())
                .map(|q| q.last_price)
                .unwrap_or(0.0);

            Holding {
                symbol: entry.tradingsymbol.clone(),
                instrument_token: entry.instrument_token,
                opening_quantity: entry.quantity,
                day_delta,
                quantity: entry.quantity + day_delta,
                last_price,
            }
        })
        .collect()
}
