//! Cash Count Model (收银对账记录)
//!
//! One immutable record per (session, payment method), written when
//! the session is closed. Historical reports read these records
//! instead of recomputing, so they stay stable even if the underlying
//! transactions are later corrected.

use serde::{Deserialize, Serialize};

/// Persisted reconciliation row for one payment method of one session.
///
/// Invariants (enforced at write time, see `reporting::reconcile`):
/// - `expected_amount = opening_amount + income_amount - expense_amount`
/// - `difference = counted_amount - expected_amount`
/// - non-cash methods always carry `owner_withdrawal = 0` and
///   `next_session_opening = 0`
/// - unique per `(session_id, payment_method_id)`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CashCountRecord {
    pub id: i64,
    pub session_id: i64,
    pub payment_method_id: i64,
    /// Method display name at close time (denormalized for reports)
    pub method_name: String,
    pub is_cash: bool,
    pub opening_amount: f64,
    pub income_amount: f64,
    /// Expenses + purchases settled with this method during the session
    pub expense_amount: f64,
    pub expected_amount: f64,
    /// Physically verified amount entered by the closing operator
    pub counted_amount: f64,
    pub difference: f64,
    /// Cash taken out by the owner at close (cash method only)
    pub owner_withdrawal: f64,
    /// Cash left in the drawer for the next session (cash method only)
    pub next_session_opening: f64,
    pub created_at: i64,
}

/// One counted amount supplied by the closing operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountedAmount {
    pub payment_method_id: i64,
    pub counted_amount: f64,
}

/// Close-session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCloseRequest {
    pub counted: Vec<CountedAmount>,
    /// Cash the owner takes home (default 0)
    #[serde(default)]
    pub owner_withdrawal: f64,
    pub note: Option<String>,
}
