//! P&L Aggregator
//!
//! Accrual-basis profit and loss: unpaid obligations still reduce
//! profit in the period incurred, so COGS and opex each carry paid and
//! unpaid portions as separate labeled fields. This coexists with the
//! strictly cash-settled balance ledger; the two bases are never
//! collapsed into one number.

use rust_decimal::Decimal;
use serde::Serialize;

use super::money::{pct_of, to_decimal, to_f64};

/// Default profit-tax assumption, applied only to positive pre-tax profit
pub const DEFAULT_TAX_RATE: f64 = 0.20;

/// One operating-expense category (input side)
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub paid: f64,
    pub unpaid: f64,
}

/// Aggregated inputs for one period
#[derive(Debug, Clone, Default)]
pub struct PnlInputs {
    pub revenue: f64,
    pub order_count: i64,
    pub cogs_paid: f64,
    pub cogs_unpaid: f64,
    pub categories: Vec<ExpenseCategory>,
}

/// Category with its share of revenue (output side)
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub name: String,
    pub total: f64,
    pub paid: f64,
    pub unpaid: f64,
    /// category total / revenue * 100, one decimal; 0 when revenue is 0
    pub pct_of_revenue: f64,
}

/// Computed P&L for one period; transient, recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct PnlSnapshot {
    pub revenue: f64,
    pub order_count: i64,
    pub cogs: f64,
    pub cogs_paid: f64,
    pub cogs_unpaid: f64,
    pub operating_expenses: f64,
    pub opex_paid: f64,
    pub opex_unpaid: f64,
    pub expense_categories: Vec<CategoryBreakdown>,
    pub gross_profit: f64,
    pub profit_before_tax: f64,
    pub tax: f64,
    pub net_profit: f64,
    // Margins as % of revenue, one decimal; all 0 when revenue is 0
    pub cogs_margin: f64,
    pub opex_margin: f64,
    pub gross_margin: f64,
    pub profit_before_tax_margin: f64,
    pub net_margin: f64,
}

/// Compute the period P&L.
///
/// `gross = revenue - (cogs_paid + cogs_unpaid)`,
/// `pretax = gross - (opex_paid + opex_unpaid)`,
/// `tax = max(pretax, 0) * tax_rate`, `net = pretax - tax`.
/// Zero revenue with nonzero costs is valid: profits go negative,
/// revenue-relative percentages resolve to 0.
pub fn compute(inputs: &PnlInputs, tax_rate: f64) -> PnlSnapshot {
    let revenue = to_decimal(inputs.revenue);
    let cogs_paid = to_decimal(inputs.cogs_paid);
    let cogs_unpaid = to_decimal(inputs.cogs_unpaid);
    let cogs = cogs_paid + cogs_unpaid;

    let mut opex_paid = Decimal::ZERO;
    let mut opex_unpaid = Decimal::ZERO;
    let expense_categories: Vec<CategoryBreakdown> = inputs
        .categories
        .iter()
        .map(|cat| {
            let paid = to_decimal(cat.paid);
            let unpaid = to_decimal(cat.unpaid);
            let total = paid + unpaid;
            opex_paid += paid;
            opex_unpaid += unpaid;
            CategoryBreakdown {
                name: cat.name.clone(),
                total: to_f64(total),
                paid: cat.paid,
                unpaid: cat.unpaid,
                pct_of_revenue: pct_of(total, revenue, 1),
            }
        })
        .collect();
    let opex = opex_paid + opex_unpaid;

    let gross_profit = revenue - cogs;
    let profit_before_tax = gross_profit - opex;
    let tax = profit_before_tax.max(Decimal::ZERO) * to_decimal(tax_rate);
    let net_profit = profit_before_tax - tax;

    PnlSnapshot {
        revenue: inputs.revenue,
        order_count: inputs.order_count,
        cogs: to_f64(cogs),
        cogs_paid: inputs.cogs_paid,
        cogs_unpaid: inputs.cogs_unpaid,
        operating_expenses: to_f64(opex),
        opex_paid: to_f64(opex_paid),
        opex_unpaid: to_f64(opex_unpaid),
        expense_categories,
        gross_profit: to_f64(gross_profit),
        profit_before_tax: to_f64(profit_before_tax),
        tax: to_f64(tax),
        net_profit: to_f64(net_profit),
        cogs_margin: pct_of(cogs, revenue, 1),
        opex_margin: pct_of(opex, revenue, 1),
        gross_margin: pct_of(gross_profit, revenue, 1),
        profit_before_tax_margin: pct_of(profit_before_tax, revenue, 1),
        net_margin: pct_of(net_profit, revenue, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, paid: f64, unpaid: f64) -> ExpenseCategory {
        ExpenseCategory {
            name: name.to_string(),
            paid,
            unpaid,
        }
    }

    #[test]
    fn standard_period_scenario() {
        let inputs = PnlInputs {
            revenue: 10_000_000.0,
            order_count: 120,
            cogs_paid: 3_000_000.0,
            cogs_unpaid: 500_000.0,
            categories: vec![category("Nhân sự", 1_000_000.0, 0.0)],
        };
        let pnl = compute(&inputs, DEFAULT_TAX_RATE);

        assert_eq!(pnl.cogs, 3_500_000.0);
        assert_eq!(pnl.gross_profit, 6_500_000.0);
        assert_eq!(pnl.profit_before_tax, 5_500_000.0);
        assert_eq!(pnl.tax, 1_100_000.0);
        assert_eq!(pnl.net_profit, 4_400_000.0);

        assert_eq!(pnl.cogs_margin, 35.0);
        assert_eq!(pnl.gross_margin, 65.0);
        assert_eq!(pnl.opex_margin, 10.0);
        assert_eq!(pnl.profit_before_tax_margin, 55.0);
        assert_eq!(pnl.net_margin, 44.0);

        assert_eq!(pnl.expense_categories[0].pct_of_revenue, 10.0);
    }

    #[test]
    fn loss_period_pays_no_tax() {
        let inputs = PnlInputs {
            revenue: 1_000_000.0,
            order_count: 5,
            cogs_paid: 800_000.0,
            cogs_unpaid: 400_000.0,
            categories: vec![category("Thuê mặt bằng", 500_000.0, 0.0)],
        };
        let pnl = compute(&inputs, DEFAULT_TAX_RATE);

        assert_eq!(pnl.gross_profit, -200_000.0);
        assert_eq!(pnl.profit_before_tax, -700_000.0);
        assert_eq!(pnl.tax, 0.0);
        assert_eq!(pnl.net_profit, -700_000.0);
        assert_eq!(pnl.net_margin, -70.0);
    }

    #[test]
    fn zero_revenue_never_divides() {
        let inputs = PnlInputs {
            revenue: 0.0,
            order_count: 0,
            cogs_paid: 100_000.0,
            cogs_unpaid: 0.0,
            categories: vec![category("Điện nước", 50_000.0, 20_000.0)],
        };
        let pnl = compute(&inputs, DEFAULT_TAX_RATE);

        assert_eq!(pnl.gross_profit, -100_000.0);
        assert_eq!(pnl.profit_before_tax, -170_000.0);
        assert_eq!(pnl.net_profit, -170_000.0);
        // Revenue-relative percentages resolve to 0, not NaN
        assert_eq!(pnl.cogs_margin, 0.0);
        assert_eq!(pnl.net_margin, 0.0);
        assert_eq!(pnl.expense_categories[0].pct_of_revenue, 0.0);
    }

    #[test]
    fn paid_and_unpaid_stay_separate() {
        let inputs = PnlInputs {
            revenue: 2_000_000.0,
            order_count: 10,
            cogs_paid: 300_000.0,
            cogs_unpaid: 200_000.0,
            categories: vec![category("Marketing", 100_000.0, 150_000.0)],
        };
        let pnl = compute(&inputs, DEFAULT_TAX_RATE);
        assert_eq!(pnl.cogs_paid, 300_000.0);
        assert_eq!(pnl.cogs_unpaid, 200_000.0);
        assert_eq!(pnl.opex_paid, 100_000.0);
        assert_eq!(pnl.opex_unpaid, 150_000.0);
        assert_eq!(pnl.operating_expenses, 250_000.0);
    }
}
