//! Execution workflow: fetch → allocate → shape orders → submit.
//!
//! The run context moves through three phases, each an explicit value:
//! a priced [`Snapshot`] (fetched), an [`AllocationPlan`] with its shaped
//! orders (allocated), and an [`ExecutionReport`] (executed). Executing an
//! empty plan yields an empty report, not an error.

use log::{error, info};

use evenlot_broker::Brokerage;
use evenlot_broker::kite::KiteClient;
use evenlot_broker::types::{OrderReceipt, OrderRequest, QuoteId, Segment, Variety};

use crate::allocation::{self, AllocationPlan, AllocationRecord};
use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::holdings::{self, Holding};
use crate::order::OrderBuilder;
use crate::valuation::Snapshot;

/// Options for a rebalance run.
pub struct RunOptions {
    /// Explicit target value per holding; non-positive values fall back
    /// to the largest eligible holding's current value.
    pub target_value: Option<f64>,
    pub dry_run: bool,
    pub force: bool,
}

/// An order that could not be submitted, with its captured error.
#[derive(Debug, Clone)]
pub struct FailedOrder {
    pub order: OrderRequest,
    pub error: String,
}

/// Outcome of submitting a batch of orders. `executed` and `failed`
/// partition the submitted orders; `receipts` pairs with `executed` by
/// position.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    executed: Vec<OrderRequest>,
    receipts: Vec<OrderReceipt>,
    failed: Vec<FailedOrder>,
}

impl ExecutionReport {
    /// Successfully submitted orders.
    pub fn executed(&self) -> &[OrderRequest] {
        &self.executed
    }

    /// Broker confirmations, paired by position with `executed`.
    pub fn receipts(&self) -> &[OrderReceipt] {
        &self.receipts
    }

    /// Orders whose submission failed.
    pub fn failed(&self) -> &[FailedOrder] {
        &self.failed
    }
}

/// Fetch holdings, day positions, and prices into a priced snapshot.
///
/// Any fetch failure is fatal to the run; the pipeline never continues
/// on partial market data.
pub fn fetch_snapshot(broker: &dyn Brokerage, exchange: &str) -> Result<Snapshot> {
    let entries = broker.holdings().map_err(|e| fetch_error("holdings", e))?;
    let day_positions = broker
        .day_positions()
        .map_err(|e| fetch_error("positions", e))?;

    let quote_ids: Vec<QuoteId> = entries
        .iter()
        .map(|h| QuoteId::new(exchange, &h.tradingsymbol))
        .collect();
    let quotes = broker.ltp(&quote_ids).map_err(|e| fetch_error("ltp", e))?;

    let holdings = holdings::assemble(&entries, &day_positions, &quotes, exchange);
    info!(
        "Fetched {} holdings, {} day positions",
        holdings.len(),
        day_positions.len()
    );
    Ok(Snapshot::new(holdings))
}

fn fetch_error(stage: &str, e: evenlot_broker::BrokerError) -> Error {
    error!("Fetch failed during {stage}: {e}");
    Error::Fetch(format!("{stage}: {e}"))
}

/// Submit each order exactly once, in list order. A failure is recorded
/// and the batch continues; there are no retries and no rollback of
/// prior orders.
pub fn submit_all(broker: &dyn Brokerage, orders: &[OrderRequest]) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for order in orders {
        match broker.place_order(Variety::Regular, order) {
            Ok(receipt) => {
                info!(
                    "Order accepted: {} {} x{} (id {})",
                    order.transaction_type, order.tradingsymbol, order.quantity, receipt.order_id
                );
                report.executed.push(order.clone());
                report.receipts.push(receipt);
            }
            Err(e) => {
                error!("Order failed for {}: {e}", order.tradingsymbol);
                report.failed.push(FailedOrder {
                    order: order.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Result of a completed run: the plan and what actually executed.
pub struct RunOutcome {
    plan: AllocationPlan,
    execution: ExecutionReport,
}

impl RunOutcome {
    pub fn records(&self) -> &[AllocationRecord] {
        self.plan.records()
    }

    pub fn executed_results(&self) -> &[OrderReceipt] {
        self.execution.receipts()
    }

    pub fn total_buy_amount(&self) -> f64 {
        self.plan.total_buy_amount()
    }

    pub fn max_current_value(&self) -> f64 {
        self.plan.max_current_value()
    }

    pub fn target_value(&self) -> f64 {
        self.plan.target_value()
    }

    pub fn failed_orders(&self) -> &[FailedOrder] {
        self.execution.failed()
    }

    pub fn plan(&self) -> &AllocationPlan {
        &self.plan
    }

    pub fn execution(&self) -> &ExecutionReport {
        &self.execution
    }
}

/// Plan a rebalance without executing: fetch, allocate, shape orders.
pub fn plan_rebalance(
    broker: &dyn Brokerage,
    exchange: &str,
    target_value: Option<f64>,
) -> Result<(AllocationPlan, Vec<OrderRequest>)> {
    let snapshot = fetch_snapshot(broker, exchange)?;
    let plan = allocation::allocate(&snapshot, exchange, target_value);
    let orders = OrderBuilder::new(broker, exchange).build_buy_orders(&plan)?;
    Ok((plan, orders))
}

/// Plan and execute in one call.
pub fn rebalance(
    broker: &dyn Brokerage,
    exchange: &str,
    target_value: Option<f64>,
) -> Result<RunOutcome> {
    let (plan, orders) = plan_rebalance(broker, exchange, target_value)?;
    let execution = submit_all(broker, &orders);
    Ok(RunOutcome { plan, execution })
}

/// Connect a live session from config plus access token.
fn connect(config: &Config, access_token: &str) -> Result<KiteClient> {
    KiteClient::connect(&config.credentials.api_key, access_token)
        .map_err(|e| Error::Session(e.to_string()))
}

/// Execute a full rebalance run with display, audit trail, and
/// confirmation.
pub fn run(config: &Config, access_token: &str, opts: &RunOptions) -> Result<()> {
    let client = connect(config, access_token)?;
    let exchange = config.market.exchange.as_str();

    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, exchange, opts.target_value)?;

    let snapshot = fetch_snapshot(&client, exchange)?;
    audit::log_holdings(&mut audit, snapshot.holdings())?;
    display_holdings(snapshot.holdings());

    let plan = allocation::allocate(&snapshot, exchange, opts.target_value);
    audit::log_allocation(&mut audit, &plan)?;
    display_plan(&plan);

    let orders = OrderBuilder::new(&client, exchange).build_buy_orders(&plan)?;
    if orders.is_empty() {
        println!("\nNo orders to place — every eligible holding is at or above target.");
        audit.log_simple("no_orders")?;
        return Ok(());
    }
    display_orders(&orders);

    if opts.dry_run {
        println!("\n[DRY RUN] No orders submitted.");
        return Ok(());
    }

    if !opts.force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Submit {} orders?", orders.len()))
            .default(false)
            .interact()
            .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))?;

        if !confirmed {
            println!("Aborted.");
            audit.log("user_confirmed", serde_json::json!({"approved": false}))?;
            return Ok(());
        }

        audit.log("user_confirmed", serde_json::json!({"approved": true}))?;
    }

    let report = submit_all(&client, &orders);
    for (order, receipt) in report.executed().iter().zip(report.receipts()) {
        audit::log_order_submitted(&mut audit, order, receipt)?;
    }
    for failed in report.failed() {
        audit::log_order_failed(&mut audit, failed)?;
    }
    audit::log_run_completed(
        &mut audit,
        orders.len(),
        report.failed().len(),
        plan.total_buy_amount(),
    )?;

    display_report(&report);
    println!(
        "\n{} submitted, {} accepted, {} failed. Audit logged to {}",
        orders.len(),
        report.executed().len(),
        report.failed().len(),
        config.audit_path().display()
    );

    Ok(())
}

/// Show aggregated holdings with current values.
pub fn show_holdings(config: &Config, access_token: &str) -> Result<()> {
    let client = connect(config, access_token)?;
    let snapshot = fetch_snapshot(&client, &config.market.exchange)?;

    display_holdings(snapshot.holdings());
    if let Some(symbol) = snapshot.max_value_symbol() {
        println!(
            "\nLargest eligible holding: {} (₹{:.2})",
            symbol,
            snapshot.max_current_value()
        );
    }
    Ok(())
}

/// Check the brokerage session and show equity margins.
pub fn check_status(config: &Config, access_token: &str) -> Result<()> {
    print!("Connecting as {}... ", config.credentials.api_key);
    let client = connect(config, access_token)?;
    println!("OK");

    let margins = client
        .margins(Some(Segment::Equity))
        .map_err(|e| Error::Fetch(format!("margins: {e}")))?;
    if let Some(equity) = margins.equity {
        println!(
            "Equity segment: net ₹{:.2}, cash ₹{:.2}",
            equity.net, equity.available.cash
        );
    }
    Ok(())
}

// === Display helpers ===

fn display_holdings(holdings: &[Holding]) {
    if holdings.is_empty() {
        println!("No holdings.");
        return;
    }

    println!("HOLDINGS:");
    println!(
        "  {:10} {:>8} {:>6} {:>8} {:>10} {:>12}",
        "Symbol", "Opening", "Day", "Qty", "LTP", "Value"
    );
    for h in holdings {
        println!(
            "  {:10} {:>8} {:>+6} {:>8} {:>10.2} {:>12.2}",
            h.symbol,
            h.opening_quantity,
            h.day_delta,
            h.quantity,
            h.last_price,
            h.current_value(),
        );
    }
}

fn display_plan(plan: &AllocationPlan) {
    println!(
        "\nTarget value: ₹{:.2} (max current value ₹{:.2})",
        plan.target_value(),
        plan.max_current_value()
    );

    println!("ALLOCATIONS:");
    println!(
        "  {:10} {:>6} {:>10} {:>12} {:>12} {:>7} {:>12} {:>12}",
        "Symbol", "Qty", "LTP", "Current", "Gap", "Buy", "Amount", "Proposed"
    );
    for r in plan.records() {
        println!(
            "  {:10} {:>6} {:>10.2} {:>12.2} {:>12.2} {:>7} {:>12.2} {:>12.2}",
            r.symbol,
            r.quantity,
            r.last_price,
            r.current_value,
            r.target_gap,
            r.buy_quantity,
            r.buy_amount,
            r.proposed_value,
        );
    }

    println!("\nTotal buy amount: ₹{:.2}", plan.total_buy_amount());
}

fn display_orders(orders: &[OrderRequest]) {
    println!("\nORDERS:");
    for (i, order) in orders.iter().enumerate() {
        match order.price {
            Some(price) => println!(
                "  {:>3}  {} {:10} x{:<6} LIMIT @ ₹{:.2}",
                i + 1,
                order.transaction_type,
                order.tradingsymbol,
                order.quantity,
                price,
            ),
            None => println!(
                "  {:>3}  {} {:10} x{:<6} MARKET",
                i + 1,
                order.transaction_type,
                order.tradingsymbol,
                order.quantity,
            ),
        }
    }
}

fn display_report(report: &ExecutionReport) {
    println!();
    for (order, receipt) in report.executed().iter().zip(report.receipts()) {
        println!(
            "  OK     {} {} x{} (order id {})",
            order.transaction_type, order.tradingsymbol, order.quantity, receipt.order_id
        );
    }
    for failed in report.failed() {
        println!(
            "  FAILED {} {} x{}: {}",
            failed.order.transaction_type,
            failed.order.tradingsymbol,
            failed.order.quantity,
            failed.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evenlot_broker::mock::MockBrokerage;
    use evenlot_broker::types::{OrderStyle, Product, TradeType};

    fn market_buy(symbol: &str, quantity: u64) -> OrderRequest {
        OrderRequest {
            tradingsymbol: symbol.to_string(),
            exchange: "NSE".to_string(),
            quantity,
            transaction_type: TradeType::Buy,
            order_type: OrderStyle::Market,
            price: None,
            product: Product::Cnc,
        }
    }

    #[test]
    fn submit_all_partitions_executed_and_failed() {
        let broker = MockBrokerage::builder().failing_symbol("TCS").build();
        let orders = vec![
            market_buy("INFY", 10),
            market_buy("TCS", 5),
            market_buy("SBIN", 2),
        ];

        let report = submit_all(&broker, &orders);

        assert_eq!(report.executed().len(), 2);
        assert_eq!(report.receipts().len(), 2);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].order.tradingsymbol, "TCS");
        // All three were attempted, in order.
        let placed = broker.placed_orders();
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[1].tradingsymbol, "TCS");
    }

    #[test]
    fn submit_all_empty_is_empty() {
        let broker = MockBrokerage::builder().build();
        let report = submit_all(&broker, &[]);
        assert!(report.executed().is_empty());
        assert!(report.receipts().is_empty());
        assert!(report.failed().is_empty());
    }
}
