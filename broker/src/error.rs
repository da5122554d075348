//! Broker error types.

/// Errors that can occur during brokerage operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("order error: {0}")]
    Order(String),

    #[error("invalid instrument: {0}")]
    InvalidInstrument(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("{0}")]
    Other(String),
}
