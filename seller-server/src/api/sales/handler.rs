//! Sale API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Sale, SaleAddProducts, SaleCreate, SaleRemoveProducts};
use crate::db::repository::{
    BundleRepository, CategoryRepository, ProductRepository, SaleRepository,
};
use crate::services::SaleService;
use crate::services::sale::SaleRemovalReport;
use crate::utils::time::{millis_to_rfc3339, now_millis};
use crate::utils::validation::parse_record_id;
use shared::{AppError, AppResult, ErrorCode};

// =============================================================================
// View types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SaleCategoryView {
    pub category_id: String,
    pub category_name: String,
    pub discount: f64,
}

#[derive(Debug, Serialize)]
pub struct SaleProductView {
    pub product_id: String,
    pub name: String,
    pub mrp: f64,
    pub selling_price: f64,
}

#[derive(Debug, Serialize)]
pub struct SaleBundleMemberView {
    pub product_id: String,
    pub product_name: String,
}

#[derive(Debug, Serialize)]
pub struct SaleBundleView {
    pub bundle_id: String,
    pub name: String,
    pub selling_price: f64,
    pub products: Vec<SaleBundleMemberView>,
}

#[derive(Debug, Serialize)]
pub struct SaleView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub categories: Vec<SaleCategoryView>,
    pub products: Vec<SaleProductView>,
    pub bundles: Vec<SaleBundleView>,
}

async fn resolve_view(state: &ServerState, sale: &Sale) -> AppResult<SaleView> {
    let categories = CategoryRepository::new(state.get_db());
    let products = ProductRepository::new(state.get_db());
    let bundles = BundleRepository::new(state.get_db());

    let mut category_views = Vec::with_capacity(sale.categories.len());
    for entry in &sale.categories {
        let name = categories
            .find_by_id(&entry.category_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();
        category_views.push(SaleCategoryView {
            category_id: entry.category_id.to_string(),
            category_name: name,
            discount: entry.discount,
        });
    }

    let mut product_views = Vec::with_capacity(sale.products.len());
    for entry in &sale.products {
        if let Some(product) = products.find_by_id(&entry.product_id).await? {
            product_views.push(SaleProductView {
                product_id: entry.product_id.to_string(),
                name: product.name,
                mrp: product.mrp,
                selling_price: product.selling_price,
            });
        }
    }

    let mut bundle_views = Vec::with_capacity(sale.bundles.len());
    for entry in &sale.bundles {
        let Some(bundle) = bundles.find_by_id(&entry.bundle_id).await? else {
            continue;
        };
        let mut members = Vec::with_capacity(bundle.products.len());
        for line in &bundle.products {
            let name = products
                .find_by_id(&line.product_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown Product".to_string());
            members.push(SaleBundleMemberView {
                product_id: line.product_id.to_string(),
                product_name: name,
            });
        }
        bundle_views.push(SaleBundleView {
            bundle_id: entry.bundle_id.to_string(),
            name: bundle.name,
            selling_price: bundle.selling_price,
            products: members,
        });
    }

    Ok(SaleView {
        id: sale.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        name: sale.name.clone(),
        description: sale.description.clone(),
        start_date: millis_to_rfc3339(sale.start_at),
        end_date: millis_to_rfc3339(sale.end_at),
        categories: category_views,
        products: product_views,
        bundles: bundle_views,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/sales - 排期促销活动 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SaleCreate>,
) -> AppResult<(StatusCode, Json<SaleView>)> {
    let service = SaleService::new(&state);
    let sale = service.create(&user, payload, now_millis()).await?;

    tracing::info!(sale = %sale.name, admin = %user.id, "Sale scheduled");

    Ok((StatusCode::CREATED, Json(resolve_view(&state, &sale).await?)))
}

/// GET /api/sales/{id} - 活动详情 (进行中或未开始)
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<SaleView>> {
    let record =
        parse_record_id("sale", &id).map_err(|_| AppError::validation("Invalid sale ID"))?;

    let repo = SaleRepository::new(state.get_db());
    let sale = repo
        .find_visible(&record, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))?;

    Ok(Json(resolve_view(&state, &sale).await?))
}

/// POST /api/sales/{id}/products - 卖家将商品加入活动
pub async fn add_products(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SaleAddProducts>,
) -> AppResult<Json<shared::ApiResponse<()>>> {
    let service = SaleService::new(&state);
    service
        .add_products(&user, &id, payload, now_millis())
        .await?;

    Ok(crate::utils::ok_with_message(
        (),
        "Products and related bundles added to the sale successfully",
    ))
}

/// DELETE /api/sales/{id}/products - 卖家将商品移出活动 (部分成功语义)
pub async fn remove_products(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SaleRemoveProducts>,
) -> AppResult<Json<SaleRemovalReport>> {
    let service = SaleService::new(&state);
    let report = service
        .remove_products(&user, &id, payload, now_millis())
        .await?;

    Ok(Json(report))
}
