//! P&L API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::api::daily_report::PeriodQuery;
use crate::core::ServerState;
use crate::db::repository::cash_count::{self, MethodCountTotals};
use crate::reporting::comparison::{self, ComparisonResult};
use crate::reporting::facts::LedgerFactSource;
use crate::reporting::period::{self, PeriodFilter};
use crate::reporting::pnl::{self, PnlInputs, PnlSnapshot};
use crate::reporting::reconcile::CashFlowTotals;
use crate::utils::{AppResult, time};

/// 对账现金流块：按支付方式的 expected/counted 汇总
#[derive(Debug, Serialize)]
pub struct CashFlowBlock {
    pub methods: Vec<MethodCountTotals>,
    pub totals: CashFlowTotals,
}

#[derive(Debug, Serialize)]
pub struct PnlResponse {
    pub filter: PeriodFilter,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub comparison_caption: &'static str,
    pub pnl: PnlSnapshot,
    pub revenue_change: ComparisonResult,
    /// Proxy: prior-period costs are not recomputed, so net-profit
    /// trend follows the revenue trend.
    pub net_profit_change: ComparisonResult,
    pub cash_flow: CashFlowBlock,
}

/// GET /api/reports/pnl - 期间损益报表
///
/// 权责发生制损益 (含未付成本/费用) + 现金对账汇总。
pub async fn pnl_report(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<PnlResponse>> {
    let tz = state.config.timezone;
    let filter = PeriodFilter::parse_lenient(&query.filter);
    let window = period::resolve(
        filter,
        query.date_from.as_deref(),
        query.date_to.as_deref(),
        time::today(tz),
    )?;
    let prior = period::previous(&window);

    let range = window.to_utc_range(tz);
    let prior_range = prior.to_utc_range(tz);

    let facts = state.fact_source();
    let totals = facts.sales_totals(range).await?;
    let prior_totals = facts.sales_totals(prior_range).await?;

    let (cogs_paid, cogs_unpaid) = facts.purchase_cost_split(range).await?;
    let categories = facts.expense_categories(range).await?;

    let snapshot = pnl::compute(
        &PnlInputs {
            revenue: totals.total_amount,
            order_count: totals.order_count,
            cogs_paid,
            cogs_unpaid,
            categories,
        },
        state.config.tax_rate,
    );

    let revenue_change = comparison::compare(totals.total_amount, prior_totals.total_amount);
    let net_profit_change = revenue_change.clone();

    let method_totals =
        cash_count::window_totals_by_method(&state.pool, range.start_millis, range.end_millis)
            .await?;
    let cash_totals =
        CashFlowTotals::accumulate(method_totals.iter().map(|m| (m.expected, m.counted)));

    Ok(Json(PnlResponse {
        filter,
        date_from: window.start,
        date_to: window.end,
        comparison_caption: filter.comparison_caption(),
        pnl: snapshot,
        revenue_change,
        net_profit_change,
        cash_flow: CashFlowBlock {
            methods: method_totals,
            totals: cash_totals,
        },
    }))
}
