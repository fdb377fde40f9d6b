//! Seller Profile API Handlers
//!
//! 简单 CRUD：资料与调用者一一对应，所有权由 user_id 绑定。

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{SellerProfile, SellerProfileCreate, SellerProfileUpdate};
use crate::db::repository::SellerProfileRepository;
use crate::services::seller_record;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
    validate_optional_text, validate_required_text,
};
use shared::{AppError, AppResult, ErrorCode};

fn require_field(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("Missing required field: {field}")))
}

/// POST /api/sellers/profile - 创建卖家资料
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SellerProfileCreate>,
) -> AppResult<(StatusCode, Json<SellerProfile>)> {
    let repo = SellerProfileRepository::new(state.get_db());
    let user_id = seller_record(&user);

    if repo.find_by_user(&user_id).await?.is_some() {
        return Err(AppError::new(ErrorCode::SellerProfileExists));
    }

    let first_name = require_field(payload.first_name, "first_name")?;
    let last_name = require_field(payload.last_name, "last_name")?;
    let shop_name = require_field(payload.shop_name, "shop_name")?;
    let shop_description = require_field(payload.shop_description, "shop_description")?;
    let address = require_field(payload.address, "address")?;
    let shop_contact_number = require_field(payload.shop_contact_number, "shop_contact_number")?;
    let business_license = require_field(payload.business_license, "business_license")?;
    let tax_id = require_field(payload.tax_id, "tax_id")?;

    if first_name.len() < 2 || last_name.len() < 2 {
        return Err(AppError::validation(
            "Names must be at least 2 characters long",
        ));
    }
    if shop_name.len() < 3 {
        return Err(AppError::validation(
            "Shop name must be at least 3 characters long",
        ));
    }
    validate_required_text(&shop_name, "shop_name", MAX_NAME_LEN)?;
    validate_required_text(&shop_description, "shop_description", MAX_DESCRIPTION_LEN)?;
    validate_required_text(&address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&shop_contact_number, "shop_contact_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.website, "website", MAX_URL_LEN)?;

    let now = now_millis();
    let profile = SellerProfile {
        id: None,
        user_id,
        first_name,
        last_name,
        dob: payload.dob,
        gender: payload.gender,
        shop_name,
        shop_description,
        address,
        shop_contact_number,
        business_license,
        tax_id,
        website: payload.website,
        created_at: now,
        updated_at: now,
    };

    let created = repo.create(profile).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/sellers/profile - 查看自己的资料
pub async fn view(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<SellerProfile>> {
    let repo = SellerProfileRepository::new(state.get_db());
    let profile = repo
        .find_by_user(&seller_record(&user))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SellerProfileNotFound))?;
    Ok(Json(profile))
}

/// PUT /api/sellers/profile - 更新自己的资料 (部分字段)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SellerProfileUpdate>,
) -> AppResult<Json<SellerProfile>> {
    let repo = SellerProfileRepository::new(state.get_db());
    let mut profile = repo
        .find_by_user(&seller_record(&user))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SellerProfileNotFound))?;

    if let Some(first_name) = payload.first_name {
        if first_name.len() < 2 {
            return Err(AppError::validation(
                "Names must be at least 2 characters long",
            ));
        }
        profile.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        if last_name.len() < 2 {
            return Err(AppError::validation(
                "Names must be at least 2 characters long",
            ));
        }
        profile.last_name = last_name;
    }
    if let Some(shop_name) = payload.shop_name {
        if shop_name.len() < 3 {
            return Err(AppError::validation(
                "Shop name must be at least 3 characters long",
            ));
        }
        validate_required_text(&shop_name, "shop_name", MAX_NAME_LEN)?;
        profile.shop_name = shop_name;
    }
    if let Some(shop_description) = payload.shop_description {
        validate_required_text(&shop_description, "shop_description", MAX_DESCRIPTION_LEN)?;
        profile.shop_description = shop_description;
    }
    if let Some(address) = payload.address {
        validate_required_text(&address, "address", MAX_ADDRESS_LEN)?;
        profile.address = address;
    }
    if let Some(contact) = payload.shop_contact_number {
        validate_required_text(&contact, "shop_contact_number", MAX_SHORT_TEXT_LEN)?;
        profile.shop_contact_number = contact;
    }
    if let Some(license) = payload.business_license {
        profile.business_license = license;
    }
    if let Some(tax_id) = payload.tax_id {
        profile.tax_id = tax_id;
    }
    validate_optional_text(&payload.website, "website", MAX_URL_LEN)?;
    if payload.website.is_some() {
        profile.website = payload.website;
    }
    if payload.dob.is_some() {
        profile.dob = payload.dob;
    }
    if payload.gender.is_some() {
        profile.gender = payload.gender;
    }

    profile.updated_at = now_millis();
    let saved = repo.save(&profile).await?;
    Ok(Json(saved))
}
