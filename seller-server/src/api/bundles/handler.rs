//! Bundle API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use surrealdb::RecordId;

use crate::api::convert::BundleView;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Bundle, BundleCreate, BundleUpdate};
use crate::db::repository::{BundleRepository, ProductRepository};
use crate::services::{BundleService, seller_record};
use crate::utils::time::now_millis;
use crate::utils::validation::parse_record_id;
use shared::{AppError, AppResult, ErrorCode};

/// Resolve member product names for one bundle
async fn resolve_view(state: &ServerState, bundle: &Bundle) -> AppResult<BundleView> {
    let repo = ProductRepository::new(state.get_db());
    let mut names: HashMap<RecordId, String> = HashMap::new();
    for line in &bundle.products {
        if let Some(product) = repo.find_by_id(&line.product_id).await? {
            names.insert(line.product_id.clone(), product.name);
        }
    }
    Ok(BundleView::from_bundle(bundle, |id| names.get(id).cloned()))
}

/// GET /api/bundles - 当前卖家的捆绑包列表
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<BundleView>>> {
    let repo = BundleRepository::new(state.get_db());
    let bundles = repo.find_for_seller(&seller_record(&user)).await?;

    if bundles.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::BundleNotFound,
            "No bundles found for this seller",
        ));
    }

    let mut views = Vec::with_capacity(bundles.len());
    for bundle in &bundles {
        views.push(resolve_view(&state, bundle).await?);
    }
    Ok(Json(views))
}

/// GET /api/bundles/{id} - 捆绑包详情 (成员商品名已解析)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<BundleView>> {
    let record = parse_record_id("bundle", &id)
        .map_err(|_| AppError::validation("Invalid bundle ID format"))?;

    let repo = BundleRepository::new(state.get_db());
    let bundle = repo
        .find_live(&record)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BundleNotFound))?;

    if bundle.seller_id != seller_record(&user) {
        return Err(AppError::forbidden("Unauthorized to view this bundle"));
    }

    Ok(Json(resolve_view(&state, &bundle).await?))
}

/// POST /api/bundles - 创建捆绑包
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BundleCreate>,
) -> AppResult<(StatusCode, Json<BundleView>)> {
    let service = BundleService::new(&state);
    let bundle = service.create(&user, payload, now_millis()).await?;

    tracing::info!(bundle = %bundle.name, seller = %user.id, "Bundle created");

    Ok((StatusCode::CREATED, Json(resolve_view(&state, &bundle).await?)))
}

/// PUT /api/bundles/{id} - 更新捆绑包 (追加成员/改折扣)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<BundleUpdate>,
) -> AppResult<Json<BundleView>> {
    let service = BundleService::new(&state);
    let bundle = service.update(&user, &id, payload, now_millis()).await?;
    Ok(Json(resolve_view(&state, &bundle).await?))
}

/// DELETE /api/bundles/{id}/products/{product_id} - 从捆绑包移除商品
pub async fn remove_product(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, product_id)): Path<(String, String)>,
) -> AppResult<Json<BundleView>> {
    let service = BundleService::new(&state);
    let bundle = service
        .remove_product(&user, &id, &product_id, now_millis())
        .await?;
    Ok(Json(resolve_view(&state, &bundle).await?))
}

/// DELETE /api/bundles/{id} - 软删除捆绑包 (清理成员引用, 级联删除折扣)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<shared::ApiResponse<()>>> {
    let service = BundleService::new(&state);
    service.delete(&user, &id, now_millis()).await?;

    Ok(crate::utils::ok_with_message((), "Bundle deleted successfully"))
}
