//! Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    CashCountRecord, PosSession, SessionCloseRequest, SessionOpen, SessionState,
};

use crate::core::ServerState;
use crate::db::repository::{cash_count, payment_method, session};
use crate::reporting::facts::TimeRange;
use crate::reporting::{ledger, reconcile};
use crate::utils::{AppError, AppResult, time};

/// Query params for listing sessions
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub state: Option<SessionState>,
}

/// GET /api/sessions - 按日期范围列出班次
///
/// 缺省范围为业务时区的今天。
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PosSession>>> {
    let tz = state.config.timezone;
    let today = time::today(tz);
    let from = match &query.date_from {
        Some(raw) => time::parse_date(raw)?,
        None => today,
    };
    let to = match &query.date_to {
        Some(raw) => time::parse_date(raw)?,
        None => today,
    };
    if from > to {
        return Err(AppError::validation(format!(
            "date_from {} is after date_to {}",
            from, to
        )));
    }

    let sessions = session::find_by_range(
        &state.pool,
        time::day_start_millis(from, tz),
        time::day_end_millis(to, tz),
        query.state,
    )
    .await?;
    Ok(Json(sessions))
}

/// POST /api/sessions - 开班
pub async fn open(
    State(state): State<ServerState>,
    Json(payload): Json<SessionOpen>,
) -> AppResult<Json<PosSession>> {
    let opened = session::open(&state.pool, payload).await?;
    tracing::info!(session_id = opened.id, name = %opened.name, "Session opened");
    Ok(Json(opened))
}

/// GET /api/sessions/:id - 班次详情 (含对账记录)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionDetail>> {
    let pos_session = session::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Session {} not found", id)))?;
    let counts = cash_count::find_by_session(&state.pool, id).await?;
    Ok(Json(SessionDetail {
        session: pos_session,
        cash_counts: counts,
    }))
}

#[derive(Debug, serde::Serialize)]
pub struct SessionDetail {
    pub session: PosSession,
    pub cash_counts: Vec<CashCountRecord>,
}

/// POST /api/sessions/:id/close - 结班
///
/// 构建班次总账 → 对账 → 持久化 cash_count → 标记关闭。
/// 重复结班由 (session, method) 唯一约束拦截，返回 409。
pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SessionCloseRequest>,
) -> AppResult<Json<SessionDetail>> {
    let pos_session = session::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Session {} not found", id)))?;
    if pos_session.state == SessionState::Closed {
        return Err(AppError::conflict(format!("Session {} already closed", id)));
    }

    if payload.owner_withdrawal < 0.0 {
        return Err(AppError::validation(format!(
            "Owner withdrawal cannot be negative: {}",
            payload.owner_withdrawal
        )));
    }
    for counted in &payload.counted {
        if counted.counted_amount < 0.0 {
            return Err(AppError::validation(format!(
                "Counted amount cannot be negative for method {}",
                counted.payment_method_id
            )));
        }
    }

    let methods = payment_method::find_active(&state.pool).await?;
    for counted in &payload.counted {
        if !methods.iter().any(|m| m.id == counted.payment_method_id) {
            return Err(AppError::validation(format!(
                "Unknown payment method: {}",
                counted.payment_method_id
            )));
        }
    }

    // Withdrawal comes out of the counted drawer cash
    let counted_cash = methods
        .iter()
        .find(|m| m.is_cash_equivalent)
        .and_then(|cash| {
            payload
                .counted
                .iter()
                .find(|c| c.payment_method_id == cash.id)
        })
        .map(|c| c.counted_amount)
        .unwrap_or(0.0);
    if payload.owner_withdrawal > counted_cash {
        return Err(AppError::business_rule(format!(
            "Owner withdrawal {} exceeds counted cash {}",
            payload.owner_withdrawal, counted_cash
        )));
    }

    let stop_time = shared::util::now_millis();
    let range = TimeRange {
        start_millis: pos_session.start_time,
        end_millis: stop_time,
    };
    let facts = state.fact_source();
    let session_ledger = ledger::build_for_range(
        &facts,
        &methods,
        range,
        pos_session.opening_cash,
    )
    .await?;

    let records = reconcile::build_count_records(
        id,
        &session_ledger,
        &payload.counted,
        payload.owner_withdrawal,
    );
    let saved = if records.is_empty() {
        Vec::new()
    } else {
        cash_count::insert_for_session(&state.pool, &records).await?
    };

    let closed = session::close(
        &state.pool,
        id,
        stop_time,
        payload.owner_withdrawal,
        payload.note.as_deref(),
    )
    .await?;
    tracing::info!(
        session_id = id,
        methods = saved.len(),
        owner_withdrawal = payload.owner_withdrawal,
        "Session closed and reconciled"
    );

    Ok(Json(SessionDetail {
        session: closed,
        cash_counts: saved,
    }))
}

/// GET /api/sessions/:id/cash-counts - 班次对账记录
pub async fn cash_counts(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<CashCountRecord>>> {
    if session::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Session {} not found", id)));
    }
    let counts = cash_count::find_by_session(&state.pool, id).await?;
    Ok(Json(counts))
}
