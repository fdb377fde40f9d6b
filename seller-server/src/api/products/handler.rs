//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::api::convert::{DiscountView, ProductView};
use crate::api::{ListParams, Pagination};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ProductCreate, ProductUpdate};
use crate::db::repository::{DiscountRepository, ProductRepository};
use crate::db::repository::product::ProductListQuery;
use crate::services::{ProductService, seller_record};
use crate::utils::time::now_millis;
use crate::utils::validation::parse_record_id;
use shared::{AppError, AppResult};

/// 商品列表响应
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
}

/// GET /api/products - 当前卖家的商品列表 (搜索/排序/分页)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ProductListResponse>> {
    let now = now_millis();
    let repo = ProductRepository::new(state.get_db());
    let discount_repo = DiscountRepository::new(state.get_db());

    let query = ProductListQuery {
        search: params.search.clone(),
        sort_by: params.sort_by.clone().unwrap_or_else(|| "created_at".into()),
        ascending: params.ascending(),
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(10),
    };

    let (products, total) = repo.find_for_seller(&seller_record(&user), &query).await?;

    // 列表为空按本系统约定返回 404 (与格式错误区分)
    if products.is_empty() {
        return Err(AppError::with_message(
            shared::ErrorCode::ProductNotFound,
            "No products found for this seller",
        ));
    }

    let mut views = Vec::with_capacity(products.len());
    for product in &products {
        let discounts = discount_repo
            .find_by_ids_ordered(&product.discounts)
            .await?
            .iter()
            .map(|d| DiscountView::from_discount(d, now))
            .collect();
        views.push(ProductView::from_product(product, discounts));
    }

    Ok(Json(ProductListResponse {
        products: views,
        pagination: Pagination::new(total, query.page, query.limit),
    }))
}

/// GET /api/products/{id} - 商品详情 (含折扣展示形态)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ProductView>> {
    let now = now_millis();
    let record = parse_record_id("product", &id)
        .map_err(|_| AppError::validation("Invalid product ID format"))?;

    let service = ProductService::new(&state);
    let product = service.get_owned(&user, &record).await?;

    let discount_repo = DiscountRepository::new(state.get_db());
    let discounts = discount_repo
        .find_by_ids_ordered(&product.discounts)
        .await?
        .iter()
        .map(|d| DiscountView::from_discount(d, now))
        .collect();

    Ok(Json(ProductView::from_product(&product, discounts)))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let service = ProductService::new(&state);
    let product = service.create(&user, payload, now_millis()).await?;

    tracing::info!(product = %product.name, seller = %user.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ProductView::from_product(&product, Vec::new())),
    ))
}

/// PUT /api/products/{id} - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductView>> {
    let now = now_millis();
    let service = ProductService::new(&state);
    let product = service.update(&user, &id, payload, now).await?;

    let discount_repo = DiscountRepository::new(state.get_db());
    let discounts = discount_repo
        .find_by_ids_ordered(&product.discounts)
        .await?
        .iter()
        .map(|d| DiscountView::from_discount(d, now))
        .collect();

    Ok(Json(ProductView::from_product(&product, discounts)))
}

/// DELETE /api/products/{id} - 软删除商品 (级联处理捆绑包/分类引用)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<shared::ApiResponse<()>>> {
    let service = ProductService::new(&state);
    service.delete(&user, &id, now_millis()).await?;

    Ok(crate::utils::ok_with_message(
        (),
        "Product marked as deleted successfully and removed from bundles",
    ))
}
