//! Session API 模块 (营业班次)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
        .route("/{id}/cash-counts", get(handler::cash_counts))
}
