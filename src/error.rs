//! Error types for the rebalancer.

use std::path::PathBuf;

/// All errors that can occur during a rebalancing run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A session could not be established with the given access
    /// credential.
    #[error("session error: {0}")]
    Session(String),

    /// Holdings, positions, or price data could not be fetched. Fatal to
    /// the run; the pipeline never continues on partial market data.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Order shaping was asked for a trade type other than BUY or SELL.
    /// A caller bug, not a runtime condition to recover from.
    #[error("invalid trade type: {0}")]
    InvalidTradeType(String),

    /// An order could not be shaped, e.g. truncated depth for a
    /// limit-at-depth instrument.
    #[error("order error: {0}")]
    Order(String),

    #[error("execution aborted: {0}")]
    Aborted(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
