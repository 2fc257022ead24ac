//! Reporting Core
//!
//! Session-based cash reconciliation and period P&L aggregation.
//! Everything here is a pure, stateless computation over a snapshot of
//! already-persisted facts; the only mutation boundary is the
//! cash-count write at session close, which lives in the repository
//! layer behind a unique-key constraint.
//!
//! # Structure
//!
//! - [`period`] - named filter → concrete date window + prior window
//! - [`facts`] - typed read-only seam over the transaction store
//! - [`ledger`] - per-payment-method session/day ledger
//! - [`reconcile`] - counted-vs-expected variance, cash-count fields
//! - [`anomaly`] - split-tender and discount scan
//! - [`comparison`] - period-over-period percentage change
//! - [`pnl`] - accrual P&L with paid/unpaid breakdown

pub mod anomaly;
pub mod comparison;
pub mod error;
pub mod facts;
pub mod ledger;
mod money;
pub mod period;
pub mod pnl;
pub mod reconcile;

pub use anomaly::{AnomalyRecord, Severity};
pub use comparison::{ComparisonResult, Trend, compare};
pub use error::{ReportError, ReportResult};
pub use facts::{LedgerFactSource, TimeRange};
pub use ledger::{PaymentMethodLedgerRow, SessionLedger};
pub use period::{PeriodFilter, PeriodWindow};
pub use pnl::PnlSnapshot;
