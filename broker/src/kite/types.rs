//! Kite-style API response envelopes and session types.

use serde::Deserialize;

use crate::types::{MarketDepth, PositionEntry};

/// Standard response envelope. Every endpoint wraps its payload in
/// `{"status": ..., "data": ...}` and reports failures through
/// `message`/`error_type` instead of `data`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

/// The `data` object of the positions endpoint.
#[derive(Debug, Deserialize)]
pub struct PositionsData {
    #[serde(default)]
    pub net: Vec<PositionEntry>,
    #[serde(default)]
    pub day: Vec<PositionEntry>,
}

/// Full quote entry: last price plus five-level depth.
#[derive(Debug, Deserialize)]
pub struct FullQuote {
    pub instrument_token: u64,
    pub last_price: f64,
    pub depth: MarketDepth,
}

/// Result of the session-token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub access_token: String,
    #[serde(default)]
    pub public_token: Option<String>,
}

/// Minimal profile payload, fetched once to validate a session.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}
