//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::api::{ListParams, Pagination};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::CategoryRepository;
use crate::db::repository::category::CategoryListQuery;
use crate::utils::validation::parse_record_id;
use shared::{AppError, AppResult, ErrorCode};

/// 分类展示形态 (不暴露反向引用列表)
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryView>,
    pub pagination: Pagination,
}

/// GET /api/categories - 激活分类列表 (搜索/排序/分页)
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<CategoryListResponse>> {
    let repo = CategoryRepository::new(state.get_db());

    let query = CategoryListQuery {
        search: params.search.clone(),
        sort_by: params.sort_by.clone().unwrap_or_else(|| "name".into()),
        ascending: params.ascending(),
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(10),
    };

    let (categories, total) = repo.find_all_active(&query).await?;

    if categories.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            "No categories found",
        ));
    }

    let views = categories
        .iter()
        .map(|c| CategoryView {
            id: c.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            name: c.name.clone(),
            description: c.description.clone(),
            is_active: c.is_active,
        })
        .collect();

    Ok(Json(CategoryListResponse {
        categories: views,
        pagination: Pagination::new(total, query.page, query.limit),
    }))
}

/// GET /api/categories/{id} - 分类详情
///
/// 未激活的分类对卖家不可见 (403)，与不存在 (404) 区分。
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryView>> {
    let record = parse_record_id("category", &id)
        .map_err(|_| AppError::validation("Invalid category ID"))?;

    let repo = CategoryRepository::new(state.get_db());
    let category = repo
        .find_by_id(&record)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;

    if !category.is_active {
        return Err(AppError::forbidden("No category found"));
    }

    Ok(Json(CategoryView {
        id: category.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        name: category.name,
        description: category.description,
        is_active: category.is_active,
    }))
}
