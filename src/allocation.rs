//! Target allocation: per-holding value gap and buy sizing.

use evenlot_broker::types::QuoteId;

use crate::valuation::{Snapshot, is_eligible};

/// Per-symbol allocation decision.
#[derive(Debug, Clone)]
pub struct AllocationRecord {
    pub symbol: String,
    pub quote_id: QuoteId,
    pub instrument_token: u64,
    pub opening_quantity: i64,
    pub quantity: i64,
    /// Last traded price, fixed to two decimals.
    pub last_price: f64,
    pub current_value: f64,
    /// target value - current value; negative when the holding is already
    /// above target.
    pub target_gap: f64,
    pub buy_quantity: i64,
    pub buy_amount: f64,
    /// current value + buy amount.
    pub proposed_value: f64,
    /// Always 0 under the current allocator; kept so sell orders can be
    /// shaped through the same record.
    pub sell_quantity: i64,
}

/// Allocation output: ordered records plus run-level totals.
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    records: Vec<AllocationRecord>,
    target_value: f64,
    max_current_value: f64,
    total_buy_amount: f64,
}

impl AllocationPlan {
    /// Records in holding iteration order.
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    /// Record for one symbol, if it was eligible.
    pub fn record(&self, symbol: &str) -> Option<&AllocationRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn max_current_value(&self) -> f64 {
        self.max_current_value
    }

    /// Sum of buy amounts across all records.
    pub fn total_buy_amount(&self) -> f64 {
        self.total_buy_amount
    }
}

/// Compute the allocation plan for a snapshot.
///
/// The target value is `target_override` when positive, otherwise the
/// snapshot's maximum current value. Excluded symbols contribute no
/// record and do not affect totals. A price of 0.0 always sizes to a buy
/// quantity of 0; the gap is never divided by a zero price.
pub fn allocate(
    snapshot: &Snapshot,
    exchange: &str,
    target_override: Option<f64>,
) -> AllocationPlan {
    let target_value = match target_override {
        Some(t) if t > 0.0 => t,
        _ => snapshot.max_current_value(),
    };

    let mut records = Vec::new();
    let mut total_buy_amount = 0.0_f64;

    for holding in snapshot.holdings() {
        if !is_eligible(&holding.symbol) {
            continue;
        }

        let current_value = holding.current_value();
        let target_gap = target_value - current_value;
        let buy_quantity = if target_gap > 0.0 && holding.last_price > 0.0 {
            (target_gap / holding.last_price).floor() as i64
        } else {
            0
        };
        let buy_amount = buy_quantity as f64 * holding.last_price;
        total_buy_amount += buy_amount;

        records.push(AllocationRecord {
            symbol: holding.symbol.clone(),
            quote_id: holding.quote_id(exchange),
            instrument_token: holding.instrument_token,
            opening_quantity: holding.opening_quantity,
            quantity: holding.quantity,
            last_price: round2(holding.last_price),
            current_value,
            target_gap,
            buy_quantity,
            buy_amount,
            proposed_value: current_value + buy_amount,
            sell_quantity: 0,
        });
    }

    AllocationPlan {
        records,
        target_value,
        max_current_value: snapshot.max_current_value(),
        total_buy_amount,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
