//! Health Check Handler

use axum::Json;
use serde_json::{Value, json};

/// GET /api/health - 健康检查 (公共路由)
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "seller-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
