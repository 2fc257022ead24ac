//! Ledger Fact Source
//!
//! Read-only seam between the reporting core and the transaction
//! store. Three independent money flows come through here: completed
//! sales, settled expenses and settled purchases. Each row type is an
//! explicit record (no positional tuples), and every query is scoped
//! by a UTC millis range — timezone conversion never happens inside
//! aggregation.

use async_trait::async_trait;
use serde::Serialize;

use super::error::ReportResult;

/// Half-open UTC query range: `start_millis <= t < end_millis`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start_millis: i64,
    pub end_millis: i64,
}

/// Window totals over completed sales
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SalesTotals {
    pub total_amount: f64,
    pub order_count: i64,
    pub item_qty: f64,
}

/// Sales received through one payment method.
///
/// `order_count` counts distinct orders containing at least one
/// payment of this method; a split-tender order counts once under
/// each method involved. `item_qty` sums the line quantities of those
/// same orders.
#[derive(Debug, Clone, Serialize)]
pub struct MethodSales {
    pub method_id: i64,
    pub method_name: String,
    pub is_cash: bool,
    pub amount: f64,
    pub order_count: i64,
    pub item_qty: f64,
}

/// Order volume per fulfillment channel (dine-in / takeaway / delivery)
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSales {
    pub channel: String,
    pub order_count: i64,
    pub amount: f64,
}

/// Settled outflow total for one payment method
#[derive(Debug, Clone, Serialize)]
pub struct MethodAmount {
    pub method_id: i64,
    pub method_name: String,
    pub amount: f64,
}

/// One payment line of a completed order
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLine {
    pub method_id: i64,
    pub method_name: String,
    pub amount: f64,
}

/// One item line of a completed order
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineFact {
    pub product_name: String,
    pub price_unit: f64,
    pub discount_percent: f64,
    pub qty: f64,
}

/// A completed order with its payment and item lines (anomaly scan input)
#[derive(Debug, Clone, Serialize)]
pub struct CompletedOrder {
    pub order_ref: String,
    pub amount_total: f64,
    pub payments: Vec<PaymentLine>,
    pub lines: Vec<OrderLineFact>,
}

/// Read-only aggregation interface over the transaction store.
///
/// Sales queries cover only orders in a terminal paid/settled state;
/// expense and purchase queries cover only settled records, keyed by
/// their settlement timestamp. Failures propagate as
/// [`ReportError::FactSource`](super::error::ReportError) — the core
/// neither retries nor masks them.
#[async_trait]
pub trait LedgerFactSource: Send + Sync {
    async fn sales_totals(&self, range: TimeRange) -> ReportResult<SalesTotals>;

    async fn sales_by_payment_method(&self, range: TimeRange) -> ReportResult<Vec<MethodSales>>;

    async fn sales_by_channel(&self, range: TimeRange) -> ReportResult<Vec<ChannelSales>>;

    async fn paid_expenses_by_method(&self, range: TimeRange) -> ReportResult<Vec<MethodAmount>>;

    async fn paid_purchases_by_method(&self, range: TimeRange) -> ReportResult<Vec<MethodAmount>>;

    async fn completed_orders(&self, range: TimeRange) -> ReportResult<Vec<CompletedOrder>>;
}
