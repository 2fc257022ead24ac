//! Reporting error taxonomy
//!
//! Arithmetic edge cases (zero baselines, empty aggregates) are never
//! errors here; they resolve to zero so a report always renders.
//! These variants cover the genuinely exceptional paths.

use crate::db::repository::RepoError;
use crate::utils::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Bad or missing custom period bounds. User-correctable input error.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// No historical closing balance for the cash method. Reserved:
    /// every current caller recovers instead (opening defaults to zero
    /// with a warn log, see `ledger::carry_forward_opening`), so this
    /// variant exists for callers that need the strict behavior.
    #[error("No prior closing balance: {0}")]
    MissingPriorBalance(String),

    /// A reconciliation record already exists for this (session, method).
    /// The existing record is authoritative.
    #[error("Session already reconciled: {0}")]
    DuplicateReconciliation(String),

    /// The fact-source query layer failed. Propagated as-is; retry
    /// policy belongs to the storage layer, not the reporting core.
    #[error("Fact source unavailable: {0}")]
    FactSource(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

impl From<RepoError> for ReportError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(msg) => ReportError::DuplicateReconciliation(msg),
            other => ReportError::FactSource(other.to_string()),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidDateRange(msg) => AppError::Validation(msg),
            ReportError::MissingPriorBalance(msg) => AppError::BusinessRule(msg),
            ReportError::DuplicateReconciliation(msg) => AppError::Conflict(msg),
            ReportError::FactSource(msg) => AppError::Database(msg),
        }
    }
}
