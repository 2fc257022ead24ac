//! Daily Report API 模块 (日结报告)

mod handler;

pub use handler::PeriodQuery;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports/daily", get(handler::daily_report))
}
