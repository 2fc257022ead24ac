//! Persisted data models

pub mod cash_count;
pub mod payment_method;
pub mod session;

pub use cash_count::{CashCountRecord, CountedAmount, SessionCloseRequest};
pub use payment_method::PaymentMethod;
pub use session::{PosSession, SessionOpen, SessionState};
