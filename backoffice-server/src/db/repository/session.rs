//! Session Repository

use super::{RepoError, RepoResult};
use shared::models::{PosSession, SessionOpen, SessionState};
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str = "id, name, operator_id, operator_name, state, start_time, stop_time, opening_cash, owner_withdrawal, note, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PosSession>> {
    let session = sqlx::query_as::<_, PosSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM pos_session WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Open a new session. Only one session may be open at a time.
///
/// An omitted opening cash amount is inherited from the latest
/// reconciled session's leftover drawer cash (counted − withdrawal).
pub async fn open(pool: &SqlitePool, data: SessionOpen) -> RepoResult<PosSession> {
    if let Some(cash) = data.opening_cash
        && cash < 0.0
    {
        return Err(RepoError::Validation(format!(
            "Opening cash cannot be negative: {}",
            cash
        )));
    }
    if find_any_open(pool).await?.is_some() {
        return Err(RepoError::Duplicate("A session is already open".into()));
    }

    let now = shared::util::now_millis();
    let opening_cash = match data.opening_cash {
        Some(cash) => cash,
        None => super::cash_count::find_latest_cash_count(pool, now)
            .await?
            .map(|record| record.next_session_opening)
            .unwrap_or_else(|| {
                tracing::warn!("No prior cash count found, opening cash defaults to 0");
                0.0
            }),
    };
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO pos_session (name, operator_id, operator_name, state, start_time, opening_cash, note, created_at, updated_at) VALUES (?, ?, ?, 'OPEN', ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.operator_id)
    .bind(&data.operator_name)
    .bind(now)
    .bind(opening_cash)
    .bind(&data.note)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to open session".into()))
}

pub async fn find_any_open(pool: &SqlitePool) -> RepoResult<Option<PosSession>> {
    let session = sqlx::query_as::<_, PosSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM pos_session WHERE state = 'OPEN' LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// Sessions started within `[start_millis, end_millis)`, optionally
/// filtered by lifecycle state, newest first.
pub async fn find_by_range(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
    state: Option<SessionState>,
) -> RepoResult<Vec<PosSession>> {
    let sessions = match state {
        Some(state) => {
            sqlx::query_as::<_, PosSession>(&format!(
                "SELECT {SESSION_COLUMNS} FROM pos_session WHERE start_time >= ? AND start_time < ? AND state = ? ORDER BY start_time DESC"
            ))
            .bind(start_millis)
            .bind(end_millis)
            .bind(state)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PosSession>(&format!(
                "SELECT {SESSION_COLUMNS} FROM pos_session WHERE start_time >= ? AND start_time < ? ORDER BY start_time DESC"
            ))
            .bind(start_millis)
            .bind(end_millis)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(sessions)
}

/// Mark a session closed. Fails if it is not currently open.
pub async fn close(
    pool: &SqlitePool,
    id: i64,
    stop_time: i64,
    owner_withdrawal: f64,
    note: Option<&str>,
) -> RepoResult<PosSession> {
    let rows = sqlx::query(
        "UPDATE pos_session SET state = 'CLOSED', stop_time = ?, owner_withdrawal = ?, note = COALESCE(?, note), updated_at = ? WHERE id = ? AND state = 'OPEN'",
    )
    .bind(stop_time)
    .bind(owner_withdrawal)
    .bind(note)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Session {id} not found or already closed"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Session {id} not found")))
}
