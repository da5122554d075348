//! Valuation: pricing holdings and finding the largest eligible value.

use crate::holdings::Holding;

/// ETF symbols excluded from valuation and allocation by policy. They are
/// held but never drive the target or receive buy orders.
pub const EXCLUDED_SYMBOLS: [&str; 3] = ["GOLDBEES", "NIFTYBEES", "LIQUIDBEES"];

/// Whether a symbol participates in valuation and allocation.
pub fn is_eligible(symbol: &str) -> bool {
    !EXCLUDED_SYMBOLS.contains(&symbol)
}

/// Priced portfolio state, fixed for the remainder of the run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    holdings: Vec<Holding>,
    max_current_value: f64,
    max_value_symbol: Option<String>,
}

impl Snapshot {
    /// Build a snapshot, computing the maximum current value across
    /// eligible holdings (0.0 when none are eligible).
    pub fn new(holdings: Vec<Holding>) -> Self {
        let mut max_current_value = 0.0_f64;
        let mut max_value_symbol = None;

        for holding in &holdings {
            if !is_eligible(&holding.symbol) {
                continue;
            }
            let value = holding.current_value();
            if value > max_current_value {
                max_current_value = value;
                max_value_symbol = Some(holding.symbol.clone());
            }
        }

        Snapshot {
            holdings,
            max_current_value,
            max_value_symbol,
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn max_current_value(&self) -> f64 {
        self.max_current_value
    }

    /// Symbol attaining the maximum current value. Informational only;
    /// allocation records are not marked with it.
    pub fn max_value_symbol(&self) -> Option<&str> {
        self.max_value_symbol.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, quantity: i64, last_price: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            instrument_token: 1,
            opening_quantity: quantity,
            day_delta: 0,
            quantity,
            last_price,
        }
    }

    #[test]
    fn max_over_eligible_holdings() {
        let snapshot = Snapshot::new(vec![
            holding("INFY", 10, 100.0),
            holding("TCS", 10, 300.0),
        ]);
        assert_eq!(snapshot.max_current_value(), 3000.0);
        assert_eq!(snapshot.max_value_symbol(), Some("TCS"));
    }

    #[test]
    fn excluded_symbols_never_drive_max() {
        let snapshot = Snapshot::new(vec![
            holding("GOLDBEES", 1000, 60.0),
            holding("INFY", 10, 100.0),
        ]);
        assert_eq!(snapshot.max_current_value(), 1000.0);
        assert_eq!(snapshot.max_value_symbol(), Some("INFY"));
    }

    #[test]
    fn no_holdings_max_is_zero() {
        let snapshot = Snapshot::new(vec![]);
        assert_eq!(snapshot.max_current_value(), 0.0);
        assert_eq!(snapshot.max_value_symbol(), None);
    }

    #[test]
    fn all_excluded_max_is_zero() {
        let snapshot = Snapshot::new(vec![
            holding("GOLDBEES", 100, 60.0),
            holding("NIFTYBEES", 50, 250.0),
            holding("LIQUIDBEES", 10, 1000.0),
        ]);
        assert_eq!(snapshot.max_current_value(), 0.0);
        assert_eq!(snapshot.max_value_symbol(), None);
    }

    #[test]
    fn unpriced_holdings_value_zero() {
        let snapshot = Snapshot::new(vec![holding("INFY", 10, 0.0)]);
        assert_eq!(snapshot.max_current_value(), 0.0);
        assert_eq!(snapshot.max_value_symbol(), None);
    }
}
