//! Discount API 模块

mod handler;

use axum::{
    Router,
    routing::post,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/discounts", discount_routes())
}

fn discount_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::add))
        .route("/{id}", axum::routing::put(handler::update).delete(handler::remove))
}
