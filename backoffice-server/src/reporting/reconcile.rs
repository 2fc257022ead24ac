//! Variance Reconciler
//!
//! Compares the ledger's theoretical closing balance against the
//! physically counted amount at session close, and derives the field
//! set of the immutable [`CashCountRecord`] the host persists. Pure
//! arithmetic; zero-division resolves by policy, never by exception.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::CountedAmount;

use super::ledger::SessionLedger;
use super::money::{pct_of, to_decimal, to_f64};

/// Signed reconciliation signal for one payment method
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Variance {
    /// counted - expected (positive = surplus, negative = shortage)
    pub difference: f64,
    /// difference / expected * 100, rounded to 2 places; 0 when the
    /// expected balance is 0
    pub variance_pct: f64,
}

/// Compare an expected closing balance against a counted amount.
pub fn reconcile(expected: f64, counted: f64) -> Variance {
    let expected_d = to_decimal(expected);
    let difference = to_decimal(counted) - expected_d;
    Variance {
        difference: to_f64(difference),
        variance_pct: pct_of(difference, expected_d, 2),
    }
}

/// Unpersisted cash-count field set; the repository assigns the id and
/// timestamps on insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewCashCount {
    pub session_id: i64,
    pub payment_method_id: i64,
    pub method_name: String,
    pub is_cash: bool,
    pub opening_amount: f64,
    pub income_amount: f64,
    /// Expenses + purchases settled with this method (one outflow
    /// column, so `expected = opening + income - expense` matches the
    /// ledger's closing balance exactly)
    pub expense_amount: f64,
    pub expected_amount: f64,
    pub counted_amount: f64,
    pub difference: f64,
    pub owner_withdrawal: f64,
    pub next_session_opening: f64,
}

/// Derive one cash-count record per ledger row.
///
/// `counted` comes from the closing operator; a method they did not
/// count is treated as counted 0. The owner withdrawal and the
/// next-session opening apply to the cash method only; every other
/// method gets both forced to zero.
pub fn build_count_records(
    session_id: i64,
    ledger: &SessionLedger,
    counted: &[CountedAmount],
    owner_withdrawal: f64,
) -> Vec<NewCashCount> {
    ledger
        .rows
        .iter()
        .map(|row| {
            let counted_amount = counted
                .iter()
                .find(|c| c.payment_method_id == row.method_id)
                .map(|c| c.counted_amount)
                .unwrap_or(0.0);

            let outflow = to_decimal(row.expenses) + to_decimal(row.purchases);
            let expected = to_decimal(row.closing_balance);
            let variance = reconcile(row.closing_balance, counted_amount);

            let (withdrawal, next_opening) = if row.is_cash {
                let next = to_decimal(counted_amount) - to_decimal(owner_withdrawal);
                (owner_withdrawal, to_f64(next))
            } else {
                (0.0, 0.0)
            };

            NewCashCount {
                session_id,
                payment_method_id: row.method_id,
                method_name: row.method_name.clone(),
                is_cash: row.is_cash,
                opening_amount: row.opening_balance,
                income_amount: row.sales_income,
                expense_amount: to_f64(outflow),
                expected_amount: to_f64(expected),
                counted_amount,
                difference: variance.difference,
                owner_withdrawal: withdrawal,
                next_session_opening: next_opening,
            }
        })
        .collect()
}

/// Rollup across persisted counts for the PnL cash-flow block
#[derive(Debug, Clone, Default, Serialize)]
pub struct CashFlowTotals {
    pub expected: f64,
    pub counted: f64,
    pub difference: f64,
    pub variance_pct: f64,
}

impl CashFlowTotals {
    pub fn accumulate(rows: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut expected = Decimal::ZERO;
        let mut counted = Decimal::ZERO;
        for (e, c) in rows {
            expected += to_decimal(e);
            counted += to_decimal(c);
        }
        let difference = counted - expected;
        Self {
            expected: to_f64(expected),
            counted: to_f64(counted),
            difference: to_f64(difference),
            variance_pct: pct_of(difference, expected, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::ledger::{LedgerSummary, PaymentMethodLedgerRow};

    fn row(id: i64, name: &str, is_cash: bool, closing: f64) -> PaymentMethodLedgerRow {
        PaymentMethodLedgerRow {
            method_id: id,
            method_name: name.to_string(),
            is_cash,
            opening_balance: if is_cash { 100_000.0 } else { 0.0 },
            sales_income: closing - if is_cash { 100_000.0 } else { 0.0 },
            order_count: 3,
            item_qty: 7.0,
            expenses: 0.0,
            purchases: 0.0,
            closing_balance: closing,
        }
    }

    fn ledger(rows: Vec<PaymentMethodLedgerRow>) -> SessionLedger {
        SessionLedger {
            rows,
            summary: LedgerSummary::default(),
        }
    }

    #[test]
    fn variance_is_counted_minus_expected() {
        let v = reconcile(950_000.0, 940_000.0);
        assert_eq!(v.difference, -10_000.0);
        assert_eq!(v.variance_pct, -1.05);
    }

    #[test]
    fn zero_expected_yields_zero_pct() {
        let v = reconcile(0.0, 5_000.0);
        assert_eq!(v.difference, 5_000.0);
        assert_eq!(v.variance_pct, 0.0);
    }

    #[test]
    fn non_cash_methods_never_carry_withdrawal() {
        let l = ledger(vec![
            row(1, "Cash", true, 600_000.0),
            row(2, "Card", false, 300_000.0),
        ]);
        let counted = vec![
            CountedAmount {
                payment_method_id: 1,
                counted_amount: 590_000.0,
            },
            CountedAmount {
                payment_method_id: 2,
                counted_amount: 300_000.0,
            },
        ];
        let records = build_count_records(42, &l, &counted, 400_000.0);
        assert_eq!(records.len(), 2);

        let cash = &records[0];
        assert_eq!(cash.owner_withdrawal, 400_000.0);
        assert_eq!(cash.next_session_opening, 190_000.0);
        assert_eq!(cash.difference, -10_000.0);

        let card = &records[1];
        assert_eq!(card.owner_withdrawal, 0.0);
        assert_eq!(card.next_session_opening, 0.0);
        assert_eq!(card.difference, 0.0);
    }

    #[test]
    fn uncounted_method_defaults_to_zero() {
        let l = ledger(vec![row(2, "Card", false, 80_000.0)]);
        let records = build_count_records(1, &l, &[], 0.0);
        assert_eq!(records[0].counted_amount, 0.0);
        assert_eq!(records[0].difference, -80_000.0);
    }

    #[test]
    fn expected_matches_ledger_closing() {
        let l = ledger(vec![row(1, "Cash", true, 500_000.0)]);
        let records = build_count_records(1, &l, &[], 0.0);
        assert_eq!(records[0].expected_amount, 500_000.0);
        assert_eq!(
            records[0].expected_amount,
            records[0].opening_amount + records[0].income_amount - records[0].expense_amount
        );
    }

    #[test]
    fn cash_flow_totals_accumulate() {
        let totals =
            CashFlowTotals::accumulate(vec![(500_000.0, 495_000.0), (300_000.0, 300_000.0)]);
        assert_eq!(totals.expected, 800_000.0);
        assert_eq!(totals.counted, 795_000.0);
        assert_eq!(totals.difference, -5_000.0);
        assert_eq!(totals.variance_pct, -0.63);
    }
}
