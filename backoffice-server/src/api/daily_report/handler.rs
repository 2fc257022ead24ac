//! Daily Report API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::{PosSession, SessionState};

use crate::core::ServerState;
use crate::db::repository::{cash_count, payment_method, session};
use crate::reporting::anomaly::{self, AnomalyRecord};
use crate::reporting::comparison::{self, ComparisonResult};
use crate::reporting::facts::{ChannelSales, LedgerFactSource, SalesTotals, TimeRange};
use crate::reporting::ledger::{self, SessionLedger};
use crate::reporting::period::{self, PeriodFilter};
use crate::utils::{AppResult, currency, time};
use shared::models::CashCountRecord;

/// Query params for period-scoped reports. The daily report calls the
/// filter `filter_type` and the P&L calls it `period`; both are
/// accepted alongside the plain `filter` name.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default = "default_filter", alias = "filter_type", alias = "period")]
    pub filter: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn default_filter() -> String {
    "today".to_string()
}

/// One headline metric with its prior-period comparison
#[derive(Debug, Serialize)]
pub struct Metric {
    pub current: f64,
    pub previous: f64,
    pub change: ComparisonResult,
}

impl Metric {
    fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change: comparison::compare(current, previous),
        }
    }
}

/// Per-session block: closed sessions carry their persisted
/// reconciliation rows, the open one carries a live ledger.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub session: PosSession,
    pub cash_counts: Vec<CashCountRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_ledger: Option<SessionLedger>,
}

#[derive(Debug, Serialize)]
pub struct DailyReportResponse {
    pub filter: PeriodFilter,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub comparison_caption: &'static str,
    pub revenue: Metric,
    pub revenue_formatted: String,
    pub orders: Metric,
    pub items: Metric,
    pub payment_methods: SessionLedger,
    /// The cash-equivalent method's row, surfaced separately as the
    /// drawer balance block; absent when the drawer saw no movement.
    pub cash_balance: Option<crate::reporting::ledger::PaymentMethodLedgerRow>,
    pub channels: Vec<ChannelSales>,
    pub sessions: Vec<SessionReport>,
    pub anomalies: Vec<AnomalyRecord>,
}

/// GET /api/reports/daily - 日结报表
///
/// 窗口内销售总览 + 上期对比、按支付方式的余额总账、
/// 渠道分布、班次明细与异常扫描。
pub async fn daily_report(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<DailyReportResponse>> {
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

    let methods = payment_method::find_active(&state.pool).await?;
    let opening = ledger::carry_forward_opening(
        cash_count::find_latest_cash_count(&state.pool, range.start_millis)
            .await?
            .as_ref(),
    );
    let window_ledger = ledger::build_for_range(&facts, &methods, range, opening).await?;

    let channels = facts.sales_by_channel(range).await?;
    let anomalies = anomaly::detect(&facts.completed_orders(range).await?);

    let sessions =
        session_reports(&state, &facts, range, &methods).await?;

    Ok(Json(DailyReportResponse {
        filter,
        date_from: window.start,
        date_to: window.end,
        comparison_caption: filter.comparison_caption(),
        revenue: Metric::new(totals.total_amount, prior_totals.total_amount),
        revenue_formatted: currency::format_amount(
            totals.total_amount,
            &state.config.currency_symbol,
        ),
        orders: count_metric(&totals, &prior_totals),
        items: Metric::new(totals.item_qty, prior_totals.item_qty),
        cash_balance: window_ledger.rows.iter().find(|r| r.is_cash).cloned(),
        payment_methods: window_ledger,
        channels,
        sessions,
        anomalies,
    }))
}

fn count_metric(totals: &SalesTotals, prior: &SalesTotals) -> Metric {
    Metric::new(totals.order_count as f64, prior.order_count as f64)
}

async fn session_reports(
    state: &ServerState,
    facts: &dyn LedgerFactSource,
    range: TimeRange,
    methods: &[shared::models::PaymentMethod],
) -> AppResult<Vec<SessionReport>> {
    let sessions =
        session::find_by_range(&state.pool, range.start_millis, range.end_millis, None).await?;

    let mut reports = Vec::with_capacity(sessions.len());
    for pos_session in sessions {
        let report = match pos_session.state {
            SessionState::Closed => SessionReport {
                cash_counts: cash_count::find_by_session(&state.pool, pos_session.id).await?,
                live_ledger: None,
                session: pos_session,
            },
            SessionState::Open => {
                let live_range = TimeRange {
                    start_millis: pos_session.start_time,
                    end_millis: shared::util::now_millis(),
                };
                let live = ledger::build_for_range(
                    facts,
                    methods,
                    live_range,
                    pos_session.opening_cash,
                )
                .await?;
                SessionReport {
                    cash_counts: Vec::new(),
                    live_ledger: Some(live),
                    session: pos_session,
                }
            }
        };
        reports.push(report);
    }
    Ok(reports)
}
