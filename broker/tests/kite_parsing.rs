//! Wire-format parsing tests for the Kite-style API types.

use reqwest::StatusCode;

use evenlot_broker::BrokerError;
use evenlot_broker::kite::client::decode_envelope;
use evenlot_broker::kite::types::{Envelope, FullQuote, PositionsData, SessionData};
use evenlot_broker::types::{HoldingEntry, LtpQuote, MarginSummary, OrderReceipt};

use std::collections::HashMap;

#[test]
fn parse_holdings_response() {
    let body = r#"{
        "status": "success",
        "data": [
            {
                "tradingsymbol": "INFY",
                "exchange": "NSE",
                "instrument_token": 408065,
                "isin": "INE009A01021",
                "product": "CNC",
                "quantity": 10,
                "t1_quantity": 0,
                "average_price": 1480.50,
                "last_price": 1541.25,
                "pnl": 607.50
            },
            {
                "tradingsymbol": "TCS",
                "exchange": "NSE",
                "instrument_token": 2953217,
                "quantity": 5,
                "average_price": 3310.00
            }
        ]
    }"#;

    let holdings: Vec<HoldingEntry> = decode_envelope(StatusCode::OK, body).unwrap();
    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].tradingsymbol, "INFY");
    assert_eq!(holdings[0].instrument_token, 408065);
    assert_eq!(holdings[0].quantity, 10);
    assert_eq!(holdings[0].average_price, 1480.50);
    assert_eq!(holdings[1].tradingsymbol, "TCS");
}

#[test]
fn parse_positions_day_and_net() {
    let body = r#"{
        "status": "success",
        "data": {
            "net": [
                {"tradingsymbol": "INFY", "quantity": 15, "product": "CNC"}
            ],
            "day": [
                {"tradingsymbol": "INFY", "quantity": 5, "buy_quantity": 5, "sell_quantity": 0},
                {"tradingsymbol": "SBIN", "quantity": -2}
            ]
        }
    }"#;

    let positions: PositionsData = decode_envelope(StatusCode::OK, body).unwrap();
    assert_eq!(positions.net.len(), 1);
    assert_eq!(positions.day.len(), 2);
    assert_eq!(positions.day[0].tradingsymbol, "INFY");
    assert_eq!(positions.day[0].quantity, 5);
    assert_eq!(positions.day[1].quantity, -2);
}

#[test]
fn parse_ltp_map() {
    let body = r#"{
        "status": "success",
        "data": {
            "NSE:INFY": {"instrument_token": 408065, "last_price": 1541.25},
            "NSE:TCS": {"instrument_token": 2953217, "last_price": 3350.00}
        }
    }"#;

    let quotes: HashMap<String, LtpQuote> = decode_envelope(StatusCode::OK, body).unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes["NSE:INFY"].last_price, 1541.25);
    assert_eq!(quotes["NSE:TCS"].instrument_token, 2953217);
}

#[test]
fn parse_full_quote_with_depth() {
    let body = r#"{
        "status": "success",
        "data": {
            "NSE:SGBMAY29": {
                "instrument_token": 4511,
                "last_price": 7250.0,
                "volume": 1200,
                "depth": {
                    "buy": [
                        {"price": 7249.0, "quantity": 10, "orders": 2},
                        {"price": 7248.0, "quantity": 4, "orders": 1},
                        {"price": 7245.0, "quantity": 12, "orders": 3},
                        {"price": 7240.0, "quantity": 6, "orders": 1},
                        {"price": 7235.0, "quantity": 20, "orders": 4}
                    ],
                    "sell": [
                        {"price": 7252.0, "quantity": 8, "orders": 1},
                        {"price": 7255.0, "quantity": 5, "orders": 2},
                        {"price": 7258.0, "quantity": 9, "orders": 1},
                        {"price": 7260.0, "quantity": 14, "orders": 2},
                        {"price": 7265.0, "quantity": 30, "orders": 5}
                    ]
                }
            }
        }
    }"#;

    let quotes: HashMap<String, FullQuote> = decode_envelope(StatusCode::OK, body).unwrap();
    let quote = &quotes["NSE:SGBMAY29"];
    assert_eq!(quote.last_price, 7250.0);
    assert_eq!(quote.depth.buy.len(), 5);
    assert_eq!(quote.depth.sell.len(), 5);
    assert_eq!(quote.depth.sell[4].price, 7265.0);
    assert_eq!(quote.depth.buy[4].quantity, 20);
}

#[test]
fn parse_order_receipt() {
    let body = r#"{"status": "success", "data": {"order_id": "151220000000000"}}"#;
    let receipt: OrderReceipt = decode_envelope(StatusCode::OK, body).unwrap();
    assert_eq!(receipt.order_id, "151220000000000");
}

#[test]
fn parse_margin_summary() {
    let body = r#"{
        "status": "success",
        "data": {
            "equity": {
                "enabled": true,
                "net": 99725.05,
                "available": {
                    "cash": 98000.00,
                    "live_balance": 99725.05,
                    "collateral": 0.0
                },
                "utilised": {"debits": 275.0}
            }
        }
    }"#;

    let margins: MarginSummary = decode_envelope(StatusCode::OK, body).unwrap();
    let equity = margins.equity.unwrap();
    assert!(equity.enabled);
    assert_eq!(equity.net, 99725.05);
    assert_eq!(equity.available.cash, 98000.00);
    assert!(margins.commodity.is_none());
}

#[test]
fn parse_session_data() {
    let body = r#"{
        "status": "success",
        "data": {
            "user_id": "AB1234",
            "access_token": "xyzabc",
            "public_token": "pub123",
            "login_time": "2026-08-07 09:15:00"
        }
    }"#;

    let session: SessionData = decode_envelope(StatusCode::OK, body).unwrap();
    assert_eq!(session.user_id, "AB1234");
    assert_eq!(session.access_token, "xyzabc");
    assert_eq!(session.public_token.as_deref(), Some("pub123"));
}

#[test]
fn error_envelope_surfaces_message() {
    let body = r#"{
        "status": "error",
        "message": "Token is invalid or has expired.",
        "error_type": "TokenException"
    }"#;

    let result: Result<Vec<HoldingEntry>, _> = decode_envelope(StatusCode::FORBIDDEN, body);
    match result {
        Err(BrokerError::Auth(msg)) => assert!(msg.contains("expired")),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[test]
fn envelope_type_is_reusable_directly() {
    let body = r#"{"status": "success", "data": [1, 2, 3]}"#;
    let envelope: Envelope<Vec<u32>> = serde_json::from_str(body).unwrap();
    assert_eq!(envelope.status, "success");
    assert_eq!(envelope.data.unwrap(), vec![1, 2, 3]);
}
