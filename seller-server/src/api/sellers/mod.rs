//! Seller Profile API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sellers", seller_routes())
}

fn seller_routes() -> Router<ServerState> {
    Router::new().route(
        "/profile",
        get(handler::view)
            .post(handler::create)
            .put(handler::update),
    )
}
