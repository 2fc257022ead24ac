//! SQLite Fact Source
//!
//! [`LedgerFactSource`] over the embedded transaction store, plus the
//! accrual-side P&L input queries. Sales facts come from orders in a
//! terminal paid state keyed by `date_order`; expense and purchase
//! cash-flow facts are keyed by `payment_date` (the settlement
//! moment), while the accrual queries key by incurred date.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::reporting::error::{ReportError, ReportResult};
use crate::reporting::facts::{
    ChannelSales, CompletedOrder, LedgerFactSource, MethodAmount, MethodSales, OrderLineFact,
    PaymentLine, SalesTotals, TimeRange,
};
use crate::reporting::pnl::ExpenseCategory;

// Terminal sales states written by the register
const COMPLETED_STATES: &str = "('PAID', 'DONE', 'INVOICED')";

#[derive(Clone)]
pub struct SqliteFactSource {
    pool: SqlitePool,
}

impl SqliteFactSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// COGS for the accrual P&L: confirmed purchases by order date,
    /// split by settlement status. Returns `(paid, unpaid)`.
    pub async fn purchase_cost_split(&self, range: TimeRange) -> ReportResult<(f64, f64)> {
        let row: (f64, f64) = sqlx::query_as(
            r#"SELECT
                   COALESCE(SUM(CASE WHEN payment_status = 'PAID' THEN amount_total ELSE 0.0 END), 0.0),
                   COALESCE(SUM(CASE WHEN payment_status = 'UNPAID' THEN amount_total ELSE 0.0 END), 0.0)
               FROM purchase_order
               WHERE state IN ('PURCHASE', 'DONE') AND date_order >= ? AND date_order < ?"#,
        )
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(fact_err)?;
        Ok(row)
    }

    /// Operating expenses for the accrual P&L: approved or settled
    /// expenses by incurred date, grouped by category.
    pub async fn expense_categories(&self, range: TimeRange) -> ReportResult<Vec<ExpenseCategory>> {
        let rows: Vec<(String, f64, f64)> = sqlx::query_as(
            r#"SELECT category,
                   COALESCE(SUM(CASE WHEN state = 'PAID' THEN amount ELSE 0.0 END), 0.0),
                   COALESCE(SUM(CASE WHEN state = 'APPROVED' THEN amount ELSE 0.0 END), 0.0)
               FROM expense
               WHERE state IN ('APPROVED', 'PAID') AND created_at >= ? AND created_at < ?
               GROUP BY category
               ORDER BY SUM(amount) DESC"#,
        )
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        Ok(rows
            .into_iter()
            .map(|(name, paid, unpaid)| ExpenseCategory { name, paid, unpaid })
            .collect())
    }
}

fn fact_err(err: sqlx::Error) -> ReportError {
    ReportError::FactSource(err.to_string())
}

#[async_trait]
impl LedgerFactSource for SqliteFactSource {
    async fn sales_totals(&self, range: TimeRange) -> ReportResult<SalesTotals> {
        let (total_amount, order_count): (f64, i64) = sqlx::query_as(&format!(
            r#"SELECT COALESCE(SUM(amount_total), 0), COUNT(*)
               FROM pos_order
               WHERE state IN {COMPLETED_STATES} AND date_order >= ? AND date_order < ?"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(fact_err)?;

        let item_qty: f64 = sqlx::query_scalar(&format!(
            r#"SELECT COALESCE(SUM(l.qty), 0)
               FROM pos_order_line l
               JOIN pos_order o ON o.id = l.order_id
               WHERE o.state IN {COMPLETED_STATES} AND o.date_order >= ? AND o.date_order < ?"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(fact_err)?;

        Ok(SalesTotals {
            total_amount,
            order_count,
            item_qty,
        })
    }

    async fn sales_by_payment_method(&self, range: TimeRange) -> ReportResult<Vec<MethodSales>> {
        // A split-tender order counts once under each method involved,
        // so order counts are DISTINCT per method, not payment rows.
        let rows: Vec<(i64, String, bool, f64, i64)> = sqlx::query_as(&format!(
            r#"SELECT m.id, m.name, m.is_cash_equivalent,
                   COALESCE(SUM(p.amount), 0),
                   COUNT(DISTINCT p.order_id)
               FROM pos_payment p
               JOIN pos_order o ON o.id = p.order_id
               JOIN payment_method m ON m.id = p.payment_method_id
               WHERE o.state IN {COMPLETED_STATES} AND o.date_order >= ? AND o.date_order < ?
               GROUP BY m.id, m.name, m.is_cash_equivalent
               ORDER BY m.is_cash_equivalent DESC, m.name"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        let qty_rows: Vec<(i64, f64)> = sqlx::query_as(&format!(
            r#"SELECT p.payment_method_id, COALESCE(SUM(l.qty), 0)
               FROM pos_order_line l
               JOIN pos_order o ON o.id = l.order_id
               JOIN (SELECT DISTINCT order_id, payment_method_id FROM pos_payment) p
                   ON p.order_id = o.id
               WHERE o.state IN {COMPLETED_STATES} AND o.date_order >= ? AND o.date_order < ?
               GROUP BY p.payment_method_id"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;
        let qty_by_method: HashMap<i64, f64> = qty_rows.into_iter().collect();

        Ok(rows
            .into_iter()
            .map(|(method_id, method_name, is_cash, amount, order_count)| MethodSales {
                method_id,
                method_name,
                is_cash,
                amount,
                order_count,
                item_qty: qty_by_method.get(&method_id).copied().unwrap_or(0.0),
            })
            .collect())
    }

    async fn sales_by_channel(&self, range: TimeRange) -> ReportResult<Vec<ChannelSales>> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(&format!(
            r#"SELECT channel, COUNT(*), COALESCE(SUM(amount_total), 0)
               FROM pos_order
               WHERE state IN {COMPLETED_STATES} AND date_order >= ? AND date_order < ?
               GROUP BY channel
               ORDER BY SUM(amount_total) DESC"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        Ok(rows
            .into_iter()
            .map(|(channel, order_count, amount)| ChannelSales {
                channel,
                order_count,
                amount,
            })
            .collect())
    }

    async fn paid_expenses_by_method(&self, range: TimeRange) -> ReportResult<Vec<MethodAmount>> {
        let rows: Vec<(i64, String, f64)> = sqlx::query_as(
            r#"SELECT m.id, m.name, COALESCE(SUM(e.amount), 0)
               FROM expense e
               JOIN payment_method m ON m.id = e.payment_method_id
               WHERE e.state = 'PAID' AND e.payment_date >= ? AND e.payment_date < ?
               GROUP BY m.id, m.name"#,
        )
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        Ok(rows.into_iter().map(method_amount).collect())
    }

    async fn paid_purchases_by_method(&self, range: TimeRange) -> ReportResult<Vec<MethodAmount>> {
        let rows: Vec<(i64, String, f64)> = sqlx::query_as(
            r#"SELECT m.id, m.name, COALESCE(SUM(po.amount_total), 0)
               FROM purchase_order po
               JOIN payment_method m ON m.id = po.payment_method_id
               WHERE po.payment_status = 'PAID' AND po.state IN ('PURCHASE', 'DONE')
                   AND po.payment_date >= ? AND po.payment_date < ?
               GROUP BY m.id, m.name"#,
        )
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        Ok(rows.into_iter().map(method_amount).collect())
    }

    async fn completed_orders(&self, range: TimeRange) -> ReportResult<Vec<CompletedOrder>> {
        let orders: Vec<(i64, String, f64)> = sqlx::query_as(&format!(
            r#"SELECT id, order_ref, amount_total
               FROM pos_order
               WHERE state IN {COMPLETED_STATES} AND date_order >= ? AND date_order < ?
               ORDER BY date_order"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let payments: Vec<(i64, i64, String, f64)> = sqlx::query_as(&format!(
            r#"SELECT p.order_id, p.payment_method_id, m.name, p.amount
               FROM pos_payment p
               JOIN pos_order o ON o.id = p.order_id
               JOIN payment_method m ON m.id = p.payment_method_id
               WHERE o.state IN {COMPLETED_STATES} AND o.date_order >= ? AND o.date_order < ?
               ORDER BY p.id"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        let lines: Vec<(i64, String, f64, f64, f64)> = sqlx::query_as(&format!(
            r#"SELECT l.order_id, l.product_name, l.price_unit, l.discount_percent, l.qty
               FROM pos_order_line l
               JOIN pos_order o ON o.id = l.order_id
               WHERE o.state IN {COMPLETED_STATES} AND o.date_order >= ? AND o.date_order < ?
               ORDER BY l.id"#
        ))
        .bind(range.start_millis)
        .bind(range.end_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(fact_err)?;

        let mut payments_by_order: HashMap<i64, Vec<PaymentLine>> = HashMap::new();
        for (order_id, method_id, method_name, amount) in payments {
            payments_by_order
                .entry(order_id)
                .or_default()
                .push(PaymentLine {
                    method_id,
                    method_name,
                    amount,
                });
        }

        let mut lines_by_order: HashMap<i64, Vec<OrderLineFact>> = HashMap::new();
        for (order_id, product_name, price_unit, discount_percent, qty) in lines {
            lines_by_order
                .entry(order_id)
                .or_default()
                .push(OrderLineFact {
                    product_name,
                    price_unit,
                    discount_percent,
                    qty,
                });
        }

        Ok(orders
            .into_iter()
            .map(|(id, order_ref, amount_total)| CompletedOrder {
                order_ref,
                amount_total,
                payments: payments_by_order.remove(&id).unwrap_or_default(),
                lines: lines_by_order.remove(&id).unwrap_or_default(),
            })
            .collect())
    }
}

fn method_amount((method_id, method_name, amount): (i64, String, f64)) -> MethodAmount {
    MethodAmount {
        method_id,
        method_name,
        amount,
    }
}
