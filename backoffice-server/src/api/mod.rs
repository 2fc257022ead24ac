//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`daily_report`] - 日结报表接口
//! - [`pnl`] - 损益报表接口
//! - [`sessions`] - 班次管理接口

pub mod daily_report;
pub mod health;
pub mod pnl;
pub mod sessions;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// 组装完整路由
pub fn create_router(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(daily_report::router())
        .merge(pnl::router())
        .merge(sessions::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
