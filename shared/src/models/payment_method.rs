//! Payment Method Model

use serde::{Deserialize, Serialize};

/// A settlement channel (cash, card, e-wallet, ...).
///
/// `is_cash_equivalent` is a configuration-time capability flag: it
/// decides which method carries the drawer opening balance and the
/// owner-withdrawal fields. Never inferred from the display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    /// Display name (e.g. "Cash", "Card", "MoMo")
    pub name: String,
    /// Whether this method settles into the physical drawer
    pub is_cash_equivalent: bool,
    /// Inactive methods are excluded from new reports
    pub active: bool,
    pub created_at: i64,
}
