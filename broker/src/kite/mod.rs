//! Kite-style REST brokerage backend.

pub mod auth;
pub mod client;
pub mod types;

pub use client::KiteClient;
