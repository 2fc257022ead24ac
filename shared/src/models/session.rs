//! POS Session Model (营业班次)

use serde::{Deserialize, Serialize};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum SessionState {
    #[serde(rename = "OPEN")]
    #[sqlx(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    #[sqlx(rename = "CLOSED")]
    Closed,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Open
    }
}

/// A bounded operating shift against a single cash drawer.
///
/// All timestamps are UTC Unix millis.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PosSession {
    pub id: i64,
    /// Human-readable session reference (e.g. "POS/2025/03/15/001")
    pub name: String,
    pub operator_id: i64,
    pub operator_name: String,
    pub state: SessionState,
    pub start_time: i64,
    /// Null while the session is still open
    pub stop_time: Option<i64>,
    /// Cash placed in the drawer at open
    pub opening_cash: f64,
    /// Owner withdrawal taken at close (cash only)
    pub owner_withdrawal: f64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Open session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpen {
    pub name: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Starting cash amount; omitted means "carry forward the drawer
    /// cash left by the last reconciled session"
    pub opening_cash: Option<f64>,
    pub note: Option<String>,
}
