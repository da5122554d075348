//! JSONL audit trail logging.
//!
//! Each rebalancer run appends events to an audit.jsonl file, one JSON
//! object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::allocation::AllocationPlan;
use crate::error::Result;
use crate::execution::FailedOrder;
use crate::holdings::Holding;
use evenlot_broker::types::{OrderReceipt, OrderRequest};

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

/// Convenience: log a run start event.
pub fn log_run_started(
    audit: &mut AuditLog,
    exchange: &str,
    target_override: Option<f64>,
) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "exchange": exchange,
            "target_override": target_override,
        }),
    )
}

/// Convenience: log aggregated holdings.
pub fn log_holdings(audit: &mut AuditLog, holdings: &[Holding]) -> Result<()> {
    let holding_data: Vec<_> = holdings
        .iter()
        .map(|h| {
            serde_json::json!({
                "symbol": h.symbol,
                "opening_qty": h.opening_quantity,
                "day_delta": h.day_delta,
                "qty": h.quantity,
                "ltp": h.last_price,
            })
        })
        .collect();

    audit.log(
        "holdings_fetched",
        serde_json::json!({ "holdings": holding_data }),
    )
}

/// Convenience: log the computed allocation plan.
pub fn log_allocation(audit: &mut AuditLog, plan: &AllocationPlan) -> Result<()> {
    let record_data: Vec<_> = plan
        .records()
        .iter()
        .map(|r| {
            serde_json::json!({
                "symbol": r.symbol,
                "qty": r.quantity,
                "ltp": r.last_price,
                "current_value": r.current_value,
                "gap": r.target_gap,
                "buy_qty": r.buy_quantity,
                "buy_amount": r.buy_amount,
                "proposed_value": r.proposed_value,
            })
        })
        .collect();

    audit.log(
        "allocation_computed",
        serde_json::json!({
            "target_value": plan.target_value(),
            "max_current_value": plan.max_current_value(),
            "total_buy_amount": plan.total_buy_amount(),
            "records": record_data,
        }),
    )
}

/// Convenience: log an accepted order.
pub fn log_order_submitted(
    audit: &mut AuditLog,
    order: &OrderRequest,
    receipt: &OrderReceipt,
) -> Result<()> {
    audit.log(
        "order_submitted",
        serde_json::json!({
            "symbol": order.tradingsymbol,
            "transaction_type": order.transaction_type.as_str(),
            "order_type": order.order_type.as_str(),
            "qty": order.quantity,
            "price": order.price,
            "order_id": receipt.order_id,
        }),
    )
}

/// Convenience: log a failed order submission.
pub fn log_order_failed(audit: &mut AuditLog, failed: &FailedOrder) -> Result<()> {
    audit.log(
        "order_failed",
        serde_json::json!({
            "symbol": failed.order.tradingsymbol,
            "transaction_type": failed.order.transaction_type.as_str(),
            "qty": failed.order.quantity,
            "error": failed.error,
        }),
    )
}

/// Convenience: log run completion.
pub fn log_run_completed(
    audit: &mut AuditLog,
    submitted: usize,
    failed: usize,
    total_buy_amount: f64,
) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({
            "submitted": submitted,
            "failed": failed,
            "total_buy_amount": total_buy_amount,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log_simple("test_event").unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"test_event\""));
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log_simple("test").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn run_started_carries_target_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log_run_started(&mut log, "NSE", Some(5000.0)).unwrap();
            log_run_started(&mut log, "NSE", None).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].contains("\"target_override\":5000.0"));
        assert!(lines[1].contains("\"target_override\":null"));
    }
}
