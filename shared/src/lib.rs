//! Shared types for the back-office suite
//!
//! Persisted data models and small utilities used by the
//! backoffice-server crate and its tests.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
