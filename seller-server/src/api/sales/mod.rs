//! Sale API 模块
//!
//! 活动排期为管理员专属；卖家通过 products 子路由选入/退出自己的商品。

mod handler;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::auth;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales", sale_routes())
}

fn sale_routes() -> Router<ServerState> {
    // Admin-only: schedule a sale
    let admin_routes = Router::new()
        .route("/", post(handler::create))
        .route_layer(axum_middleware::from_fn(auth::require_admin));

    // Seller participation
    let seller_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/products",
            post(handler::add_products).delete(handler::remove_products),
        );

    admin_routes.merge(seller_routes)
}
