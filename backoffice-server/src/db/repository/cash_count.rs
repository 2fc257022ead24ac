//! Cash Count Repository
//!
//! Writes are insert-only: one record per (session, payment method),
//! guarded by the UNIQUE constraint. A duplicate insert means the
//! session was already finalized for that method — surfaced to the
//! caller, never silently ignored.

use super::{RepoError, RepoResult};
use crate::reporting::reconcile::NewCashCount;
use shared::models::CashCountRecord;
use sqlx::SqlitePool;

const COUNT_COLUMNS: &str = "id, session_id, payment_method_id, method_name, is_cash, opening_amount, income_amount, expense_amount, expected_amount, counted_amount, difference, owner_withdrawal, next_session_opening, created_at";

/// Persist the reconciliation rows for one session close, atomically.
/// Any duplicate (session, method) aborts the whole batch.
pub async fn insert_for_session(
    pool: &SqlitePool,
    records: &[NewCashCount],
) -> RepoResult<Vec<CashCountRecord>> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    for record in records {
        let result = sqlx::query(
            "INSERT INTO cash_count (session_id, payment_method_id, method_name, is_cash, opening_amount, income_amount, expense_amount, expected_amount, counted_amount, difference, owner_withdrawal, next_session_opening, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.session_id)
        .bind(record.payment_method_id)
        .bind(&record.method_name)
        .bind(record.is_cash)
        .bind(record.opening_amount)
        .bind(record.income_amount)
        .bind(record.expense_amount)
        .bind(record.expected_amount)
        .bind(record.counted_amount)
        .bind(record.difference)
        .bind(record.owner_withdrawal)
        .bind(record.next_session_opening)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(err) = result {
            let mapped = RepoError::from(err);
            if let RepoError::Duplicate(_) = mapped {
                return Err(RepoError::Duplicate(format!(
                    "Session {} already reconciled for payment method {}",
                    record.session_id, record.payment_method_id
                )));
            }
            return Err(mapped);
        }
    }

    tx.commit().await?;

    find_by_session(
        pool,
        records.first().map(|r| r.session_id).unwrap_or_default(),
    )
    .await
}

pub async fn find_by_session(
    pool: &SqlitePool,
    session_id: i64,
) -> RepoResult<Vec<CashCountRecord>> {
    let counts = sqlx::query_as::<_, CashCountRecord>(&format!(
        "SELECT {COUNT_COLUMNS} FROM cash_count WHERE session_id = ? ORDER BY payment_method_id"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(counts)
}

/// The cash row of the latest reconciled session started before
/// `before_start` — the drawer carry-forward source.
pub async fn find_latest_cash_count(
    pool: &SqlitePool,
    before_start: i64,
) -> RepoResult<Option<CashCountRecord>> {
    let count = sqlx::query_as::<_, CashCountRecord>(&format!(
        r#"SELECT cc.{} FROM cash_count cc
           JOIN pos_session s ON s.id = cc.session_id
           WHERE cc.is_cash = 1 AND s.start_time < ?
           ORDER BY s.start_time DESC LIMIT 1"#,
        COUNT_COLUMNS_QUALIFIED
    ))
    .bind(before_start)
    .fetch_optional(pool)
    .await?;
    Ok(count)
}

const COUNT_COLUMNS_QUALIFIED: &str = "id, cc.session_id, cc.payment_method_id, cc.method_name, cc.is_cash, cc.opening_amount, cc.income_amount, cc.expense_amount, cc.expected_amount, cc.counted_amount, cc.difference, cc.owner_withdrawal, cc.next_session_opening, cc.created_at";

/// Per-method expected/counted rollup across the closed sessions
/// started within the window (the PnL cash-flow block).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct MethodCountTotals {
    pub method_name: String,
    pub expected: f64,
    pub counted: f64,
    pub difference: f64,
}

pub async fn window_totals_by_method(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<MethodCountTotals>> {
    let totals = sqlx::query_as::<_, MethodCountTotals>(
        r#"SELECT cc.method_name AS method_name,
                  COALESCE(SUM(cc.expected_amount), 0) AS expected,
                  COALESCE(SUM(cc.counted_amount), 0) AS counted,
                  COALESCE(SUM(cc.difference), 0) AS difference
           FROM cash_count cc
           JOIN pos_session s ON s.id = cc.session_id
           WHERE s.state = 'CLOSED' AND s.start_time >= ? AND s.start_time < ?
           GROUP BY cc.method_name
           ORDER BY cc.method_name"#,
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(totals)
}
