//! P&L API 模块 (损益报表)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports/pnl", get(handler::pnl_report))
}
