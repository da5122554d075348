//! Brokerage collaborator for the evenlot rebalancer.
//!
//! Provides the generic [`Brokerage`] trait the rebalancing pipeline runs
//! against, a blocking REST client for a Kite-style brokerage API
//! (`kite`), and a configurable mock for tests (`mock`).

pub mod error;
pub mod kite;
pub mod mock;
pub mod types;

pub use error::BrokerError;
pub use kite::KiteClient;
pub use types::*;

use std::collections::HashMap;

/// An authenticated brokerage session that can report account state and
/// accept orders.
///
/// All calls are blocking. Timeout and retry policy belong to the
/// implementation, not to callers.
pub trait Brokerage {
    /// Opening holdings for the account.
    fn holdings(&self) -> Result<Vec<HoldingEntry>, BrokerError>;

    /// Net same-day traded quantity per symbol (the `day` list of the
    /// positions response).
    fn day_positions(&self) -> Result<Vec<PositionEntry>, BrokerError>;

    /// Last traded price for each requested quote id. Ids the venue does
    /// not recognize are absent from the result, not an error.
    fn ltp(&self, quotes: &[QuoteId]) -> Result<HashMap<String, LtpQuote>, BrokerError>;

    /// Order book depth (five levels per side) for each requested quote id.
    fn depth(&self, quotes: &[QuoteId]) -> Result<HashMap<String, MarketDepth>, BrokerError>;

    /// Submit one order. Failures are per-call and have no effect on other
    /// orders.
    fn place_order(
        &self,
        variety: Variety,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, BrokerError>;

    /// Margin summary, optionally restricted to one segment.
    fn margins(&self, segment: Option<Segment>) -> Result<MarginSummary, BrokerError>;
}
