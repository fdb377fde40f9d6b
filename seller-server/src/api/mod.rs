//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品管理接口
//! - [`bundles`] - 捆绑包管理接口
//! - [`discounts`] - 折扣管理接口
//! - [`sales`] - 促销活动接口
//! - [`categories`] - 分类查询接口
//! - [`sellers`] - 卖家资料接口

pub mod convert;

pub mod bundles;
pub mod categories;
pub mod discounts;
pub mod health;
pub mod products;
pub mod sales;
pub mod sellers;

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth;
use crate::core::ServerState;
use shared::{AppError, ErrorCode};

// Re-export common types for handlers
pub use shared::{ApiResponse, AppResult};

/// 列表接口通用查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    /// "asc" | "desc"
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn ascending(&self) -> bool {
        self.order.as_deref() != Some("desc")
    }
}

/// 列表接口分页信息
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let limit = limit.clamp(1, 100);
        Self {
            total,
            page: page.max(1),
            limit,
            total_pages: total.div_ceil(limit as u64),
        }
    }
}

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Catalog API - authentication required
        .merge(products::router())
        .merge(bundles::router())
        .merge(discounts::router())
        .merge(sales::router())
        .merge(categories::router())
        .merge(sellers::router())
        // Health API - public route
        .merge(health::router())
}

/// Map middleware-level failures (timeout) to the unified error shape
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::new(ErrorCode::TimeoutError)
    } else {
        AppError::internal(err.to_string())
    }
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Uniform per-request timeout, surfaced as a Timeout error
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        // Get user context (JWT authentication) - injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
}
