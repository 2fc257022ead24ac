//! Payment Method Repository

use super::RepoResult;
use shared::models::PaymentMethod;
use sqlx::SqlitePool;

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    is_cash_equivalent: bool,
) -> RepoResult<PaymentMethod> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO payment_method (name, is_cash_equivalent, active, created_at) VALUES (?, ?, 1, ?) RETURNING id",
    )
    .bind(name)
    .bind(is_cash_equivalent)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(PaymentMethod {
        id,
        name: name.to_string(),
        is_cash_equivalent,
        active: true,
        created_at: now,
    })
}

/// Active tender types, cash first then by name (stable report order)
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<PaymentMethod>> {
    let methods = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, is_cash_equivalent, active, created_at FROM payment_method WHERE active = 1 ORDER BY is_cash_equivalent DESC, name",
    )
    .fetch_all(pool)
    .await?;
    Ok(methods)
}
