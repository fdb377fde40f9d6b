//! Discount API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::convert::DiscountView;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DiscountCreate, DiscountUpdate};
use crate::services::DiscountService;
use crate::utils::time::now_millis;
use shared::AppResult;

/// POST /api/discounts - 创建折扣 (product XOR bundle)
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiscountCreate>,
) -> AppResult<(StatusCode, Json<DiscountView>)> {
    let now = now_millis();
    let service = DiscountService::new(&state);
    let discount = service.add(&user, payload, now).await?;

    tracing::info!(seller = %user.id, "Discount added");

    Ok((
        StatusCode::CREATED,
        Json(DiscountView::from_discount(&discount, now)),
    ))
}

/// PUT /api/discounts/{id} - 更新折扣 (重新评估有效期并重算目标价格)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<DiscountUpdate>,
) -> AppResult<Json<DiscountView>> {
    let now = now_millis();
    let service = DiscountService::new(&state);
    let discount = service.update(&user, &id, payload, now).await?;
    Ok(Json(DiscountView::from_discount(&discount, now)))
}

/// DELETE /api/discounts/{id} - 删除折扣 (剥离引用并重算目标价格)
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<shared::ApiResponse<()>>> {
    let service = DiscountService::new(&state);
    service.remove(&user, &id, now_millis()).await?;

    Ok(crate::utils::ok_with_message(
        (),
        "Discount deleted successfully",
    ))
}
