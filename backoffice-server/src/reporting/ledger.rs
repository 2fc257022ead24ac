//! Session Ledger Builder
//!
//! Reconciles the three money flows (sales income, settled expenses,
//! settled purchases) into one per-payment-method ledger for a single
//! session or a whole-day window. Only the cash-equivalent method
//! carries an opening balance; it is seeded from the previous
//! session's leftover drawer cash.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{CashCountRecord, PaymentMethod};

use super::error::ReportResult;
use super::facts::{LedgerFactSource, MethodAmount, MethodSales, TimeRange};
use super::money::{to_decimal, to_f64};

/// One ledger row per payment method.
///
/// Invariant: `closing_balance == opening_balance + sales_income -
/// expenses - purchases`, computed in Decimal, exact.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodLedgerRow {
    pub method_id: i64,
    pub method_name: String,
    pub is_cash: bool,
    pub opening_balance: f64,
    pub sales_income: f64,
    /// Distinct orders containing a payment of this method
    pub order_count: i64,
    pub item_qty: f64,
    pub expenses: f64,
    pub purchases: f64,
    pub closing_balance: f64,
}

/// Rolled-up totals across all emitted rows
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSummary {
    pub opening_balance: f64,
    pub sales_income: f64,
    pub expenses: f64,
    pub purchases: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionLedger {
    pub rows: Vec<PaymentMethodLedgerRow>,
    pub summary: LedgerSummary,
}

/// Opening cash carried forward from the prior session's count.
///
/// No prior record (first-ever session, or a gap in history) is
/// recoverable: the drawer starts at zero and we log it.
pub fn carry_forward_opening(prior: Option<&CashCountRecord>) -> f64 {
    match prior {
        Some(record) => record.next_session_opening,
        None => {
            tracing::warn!("No prior cash count found, opening cash balance defaults to 0");
            0.0
        }
    }
}

/// Build the per-method ledger from already-fetched fact rows.
///
/// `methods` is the configured tender universe; methods with zero
/// activity in all three streams and a zero opening balance are
/// omitted (sparse reporting).
pub fn build_ledger(
    methods: &[PaymentMethod],
    sales: &[MethodSales],
    expenses: &[MethodAmount],
    purchases: &[MethodAmount],
    cash_opening: f64,
) -> SessionLedger {
    let sales_by_id: HashMap<i64, &MethodSales> =
        sales.iter().map(|s| (s.method_id, s)).collect();
    let expense_by_id: HashMap<i64, Decimal> = expenses
        .iter()
        .map(|e| (e.method_id, to_decimal(e.amount)))
        .collect();
    let purchase_by_id: HashMap<i64, Decimal> = purchases
        .iter()
        .map(|p| (p.method_id, to_decimal(p.amount)))
        .collect();

    let mut rows = Vec::with_capacity(methods.len());
    let mut summary_opening = Decimal::ZERO;
    let mut summary_income = Decimal::ZERO;
    let mut summary_expenses = Decimal::ZERO;
    let mut summary_purchases = Decimal::ZERO;

    for method in methods {
        let opening = if method.is_cash_equivalent {
            to_decimal(cash_opening)
        } else {
            Decimal::ZERO
        };

        let (income, order_count, item_qty) = match sales_by_id.get(&method.id) {
            Some(s) => (to_decimal(s.amount), s.order_count, s.item_qty),
            None => (Decimal::ZERO, 0, 0.0),
        };
        let expense = expense_by_id.get(&method.id).copied().unwrap_or_default();
        let purchase = purchase_by_id.get(&method.id).copied().unwrap_or_default();

        // Sparse reporting: skip tender types with no movement at all
        if opening.is_zero() && income.is_zero() && expense.is_zero() && purchase.is_zero() {
            continue;
        }

        let closing = opening + income - expense - purchase;

        summary_opening += opening;
        summary_income += income;
        summary_expenses += expense;
        summary_purchases += purchase;

        rows.push(PaymentMethodLedgerRow {
            method_id: method.id,
            method_name: method.name.clone(),
            is_cash: method.is_cash_equivalent,
            opening_balance: to_f64(opening),
            sales_income: to_f64(income),
            order_count,
            item_qty,
            expenses: to_f64(expense),
            purchases: to_f64(purchase),
            closing_balance: to_f64(closing),
        });
    }

    let summary_closing = summary_opening + summary_income - summary_expenses - summary_purchases;
    SessionLedger {
        rows,
        summary: LedgerSummary {
            opening_balance: to_f64(summary_opening),
            sales_income: to_f64(summary_income),
            expenses: to_f64(summary_expenses),
            purchases: to_f64(summary_purchases),
            closing_balance: to_f64(summary_closing),
        },
    }
}

/// Pull the three fact streams for `range` and build the ledger.
pub async fn build_for_range(
    facts: &dyn LedgerFactSource,
    methods: &[PaymentMethod],
    range: TimeRange,
    cash_opening: f64,
) -> ReportResult<SessionLedger> {
    let sales = facts.sales_by_payment_method(range).await?;
    let expenses = facts.paid_expenses_by_method(range).await?;
    let purchases = facts.paid_purchases_by_method(range).await?;
    Ok(build_ledger(methods, &sales, &expenses, &purchases, cash_opening))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(id: i64, name: &str, is_cash: bool) -> PaymentMethod {
        PaymentMethod {
            id,
            name: name.to_string(),
            is_cash_equivalent: is_cash,
            active: true,
            created_at: 0,
        }
    }

    fn sales(id: i64, name: &str, is_cash: bool, amount: f64, orders: i64, qty: f64) -> MethodSales {
        MethodSales {
            method_id: id,
            method_name: name.to_string(),
            is_cash,
            amount,
            order_count: orders,
            item_qty: qty,
        }
    }

    fn outflow(id: i64, name: &str, amount: f64) -> MethodAmount {
        MethodAmount {
            method_id: id,
            method_name: name.to_string(),
            amount,
        }
    }

    #[test]
    fn closing_balance_invariant_holds() {
        let methods = vec![method(1, "Cash", true), method(2, "Card", false)];
        let ledger = build_ledger(
            &methods,
            &[
                sales(1, "Cash", true, 500_000.0, 10, 25.0),
                sales(2, "Card", false, 300_000.0, 4, 9.0),
            ],
            &[outflow(1, "Cash", 120_000.0)],
            &[outflow(1, "Cash", 80_000.0), outflow(2, "Card", 50_000.0)],
            200_000.0,
        );

        assert_eq!(ledger.rows.len(), 2);
        for row in &ledger.rows {
            assert_eq!(
                row.closing_balance,
                row.opening_balance + row.sales_income - row.expenses - row.purchases
            );
        }

        let cash = &ledger.rows[0];
        assert_eq!(cash.opening_balance, 200_000.0);
        assert_eq!(cash.closing_balance, 500_000.0);

        let card = &ledger.rows[1];
        assert_eq!(card.opening_balance, 0.0);
        assert_eq!(card.closing_balance, 250_000.0);

        assert_eq!(ledger.summary.closing_balance, 750_000.0);
    }

    #[test]
    fn idle_methods_are_omitted() {
        let methods = vec![
            method(1, "Cash", true),
            method(2, "Card", false),
            method(3, "Voucher", false),
        ];
        let ledger = build_ledger(
            &methods,
            &[sales(2, "Card", false, 100_000.0, 2, 3.0)],
            &[],
            &[],
            0.0,
        );
        assert_eq!(ledger.rows.len(), 1);
        assert_eq!(ledger.rows[0].method_name, "Card");
    }

    #[test]
    fn cash_with_only_opening_balance_is_kept() {
        let methods = vec![method(1, "Cash", true)];
        let ledger = build_ledger(&methods, &[], &[], &[], 150_000.0);
        assert_eq!(ledger.rows.len(), 1);
        assert_eq!(ledger.rows[0].closing_balance, 150_000.0);
    }

    #[test]
    fn expense_only_method_appears_with_negative_closing() {
        let methods = vec![method(2, "Card", false)];
        let ledger = build_ledger(&methods, &[], &[outflow(2, "Card", 40_000.0)], &[], 0.0);
        assert_eq!(ledger.rows.len(), 1);
        assert_eq!(ledger.rows[0].closing_balance, -40_000.0);
    }

    #[test]
    fn opening_carries_forward_from_prior_count() {
        let record = CashCountRecord {
            id: 1,
            session_id: 7,
            payment_method_id: 1,
            method_name: "Cash".to_string(),
            is_cash: true,
            opening_amount: 100_000.0,
            income_amount: 900_000.0,
            expense_amount: 50_000.0,
            expected_amount: 950_000.0,
            counted_amount: 940_000.0,
            difference: -10_000.0,
            owner_withdrawal: 700_000.0,
            next_session_opening: 240_000.0,
            created_at: 0,
        };
        assert_eq!(carry_forward_opening(Some(&record)), 240_000.0);
        assert_eq!(carry_forward_opening(None), 0.0);
    }
}
