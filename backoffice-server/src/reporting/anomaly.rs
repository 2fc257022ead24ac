//! Anomaly Detector
//!
//! Read-only scan over completed orders for patterns the owner wants
//! surfaced at end of day: split-tender payments and per-line
//! discounts. Output order is not significant; consumers group by
//! order or session for display.

use serde::Serialize;

use super::facts::CompletedOrder;
use super::money::{to_decimal, to_f64};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

/// One detected anomaly, tagged by kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyRecord {
    /// More than one payment line on a single order
    SplitPayment {
        order_ref: String,
        payment_count: usize,
        /// Method names, comma-joined for display
        payment_methods: String,
        amount: f64,
        severity: Severity,
    },
    /// A line item sold below list price
    DiscountApplied {
        order_ref: String,
        product_name: String,
        discount_percent: f64,
        original_price: f64,
        final_price: f64,
        qty: f64,
        severity: Severity,
    },
}

/// Scan a window's completed orders.
///
/// Split tender fires strictly on `> 1` payment lines. Discount fires
/// on any line with `discount_percent > 0`, with
/// `final_price = price_unit * (1 - discount/100)`.
pub fn detect(orders: &[CompletedOrder]) -> Vec<AnomalyRecord> {
    let mut anomalies = Vec::new();

    for order in orders {
        if order.payments.len() > 1 {
            let methods = order
                .payments
                .iter()
                .map(|p| p.method_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anomalies.push(AnomalyRecord::SplitPayment {
                order_ref: order.order_ref.clone(),
                payment_count: order.payments.len(),
                payment_methods: methods,
                amount: order.amount_total,
                severity: Severity::Warning,
            });
        }

        for line in &order.lines {
            if line.discount_percent > 0.0 {
                let multiplier =
                    Decimal::ONE - to_decimal(line.discount_percent) / Decimal::ONE_HUNDRED;
                anomalies.push(AnomalyRecord::DiscountApplied {
                    order_ref: order.order_ref.clone(),
                    product_name: line.product_name.clone(),
                    discount_percent: line.discount_percent,
                    original_price: line.price_unit,
                    final_price: to_f64(to_decimal(line.price_unit) * multiplier),
                    qty: line.qty,
                    severity: Severity::Info,
                });
            }
        }
    }

    anomalies
}
