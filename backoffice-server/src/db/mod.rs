//! 数据库层
//!
//! 嵌入式 SQLite 存储。schema 在连接时以 `IF NOT EXISTS` 方式应用，
//! 事实表 (订单/支付/费用/采购) 由收银端写入，本服务只读；
//! `cash_count` 是本服务唯一负责写入的持久化产物。

pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Embedded schema, applied idempotently at startup.
///
/// Money columns are REAL; arithmetic happens in `rust_decimal`
/// upstream. All timestamps are UTC Unix millis.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS payment_method (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    is_cash_equivalent INTEGER NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pos_session (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    operator_id INTEGER NOT NULL,
    operator_name TEXT NOT NULL,
    state TEXT NOT NULL DEFAULT 'OPEN' CHECK (state IN ('OPEN', 'CLOSED')),
    start_time INTEGER NOT NULL,
    stop_time INTEGER,
    opening_cash REAL NOT NULL DEFAULT 0,
    owner_withdrawal REAL NOT NULL DEFAULT 0,
    note TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pos_order (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_ref TEXT NOT NULL,
    session_id INTEGER REFERENCES pos_session(id),
    channel TEXT NOT NULL DEFAULT 'dine_in',
    state TEXT NOT NULL,
    date_order INTEGER NOT NULL,
    amount_total REAL NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_pos_order_date ON pos_order(date_order);

CREATE TABLE IF NOT EXISTS pos_order_line (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES pos_order(id),
    product_name TEXT NOT NULL,
    qty REAL NOT NULL DEFAULT 1,
    price_unit REAL NOT NULL DEFAULT 0,
    discount_percent REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS pos_payment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES pos_order(id),
    payment_method_id INTEGER NOT NULL REFERENCES payment_method(id),
    amount REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_pos_payment_order ON pos_payment(order_id);

CREATE TABLE IF NOT EXISTS expense (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'Khác',
    amount REAL NOT NULL,
    state TEXT NOT NULL DEFAULT 'DRAFT' CHECK (state IN ('DRAFT', 'APPROVED', 'PAID')),
    payment_method_id INTEGER REFERENCES payment_method(id),
    payment_date INTEGER,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS purchase_order (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    amount_total REAL NOT NULL,
    state TEXT NOT NULL DEFAULT 'DRAFT' CHECK (state IN ('DRAFT', 'PURCHASE', 'DONE', 'CANCEL')),
    payment_status TEXT NOT NULL DEFAULT 'UNPAID' CHECK (payment_status IN ('PAID', 'UNPAID')),
    payment_method_id INTEGER REFERENCES payment_method(id),
    date_order INTEGER NOT NULL,
    payment_date INTEGER
);

CREATE TABLE IF NOT EXISTS cash_count (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES pos_session(id),
    payment_method_id INTEGER NOT NULL REFERENCES payment_method(id),
    method_name TEXT NOT NULL,
    is_cash INTEGER NOT NULL DEFAULT 0,
    opening_amount REAL NOT NULL DEFAULT 0,
    income_amount REAL NOT NULL DEFAULT 0,
    expense_amount REAL NOT NULL DEFAULT 0,
    expected_amount REAL NOT NULL DEFAULT 0,
    counted_amount REAL NOT NULL DEFAULT 0,
    difference REAL NOT NULL DEFAULT 0,
    owner_withdrawal REAL NOT NULL DEFAULT 0,
    next_session_opening REAL NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    UNIQUE(session_id, payment_method_id)
);
"#;

/// Open (and create if missing) the SQLite database at `path`.
pub async fn init_pool(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests. Single connection: every handle must
/// see the same memory database.
pub async fn init_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
