//! Product Service
//!
//! Create / update / soft-delete with the cascading consistency rules:
//! a deleted product is removed from every bundle, the affected bundles are
//! repriced from their remaining members, and category back-references are
//! maintained.

use std::sync::Arc;

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::{EntityLocks, ServerState};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{BundleRepository, CategoryRepository, ProductRepository};
use crate::pricing::{RepricingEngine, selling_price};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, parse_record_id, validate_optional_text,
    validate_percentage, validate_positive_price, validate_positive_quantity,
    validate_required_text,
};
use shared::{AppError, AppResult, ErrorCode};

use super::seller_record;

#[derive(Clone)]
pub struct ProductService {
    products: ProductRepository,
    categories: CategoryRepository,
    bundles: BundleRepository,
    engine: RepricingEngine,
    locks: Arc<EntityLocks>,
}

impl ProductService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            products: ProductRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            bundles: BundleRepository::new(db.clone()),
            engine: RepricingEngine::new(db),
            locks: state.entity_locks.clone(),
        }
    }

    /// Create a product.
    ///
    /// 逐字段校验，返回第一个失败字段的消息；同名商品 (同一卖家) 冲突；
    /// 给定分类必须存在且激活。`selling_price` 在创建时即按折扣派生。
    pub async fn create(
        &self,
        user: &CurrentUser,
        payload: ProductCreate,
        now: i64,
    ) -> AppResult<Product> {
        let seller = seller_record(user);

        // Validate each field individually, first failure wins
        let name = payload
            .name
            .ok_or_else(|| AppError::validation("Invalid or missing product name"))?;
        validate_required_text(&name, "name", MAX_NAME_LEN)
            .map_err(|_| AppError::validation("Invalid or missing product name"))?;

        validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)
            .map_err(|_| AppError::validation("Invalid product description"))?;

        let mrp = payload
            .mrp
            .ok_or_else(|| AppError::validation("Invalid or missing MRP"))?;
        validate_positive_price(mrp, "MRP")?;

        let discount = payload
            .discount
            .ok_or_else(|| AppError::validation("Invalid discount"))?;
        validate_percentage(discount, "discount")?;

        let quantity = payload
            .quantity
            .ok_or_else(|| AppError::validation("Invalid or missing quantity"))?;
        validate_positive_quantity(quantity, "quantity")?;

        let category_id = payload
            .category_id
            .as_deref()
            .map(|c| parse_record_id("category", c))
            .transpose()
            .map_err(|_| AppError::validation("Invalid category ID"))?;

        // Duplicate name for the same seller
        if self
            .products
            .find_by_name_for_seller(&name, &seller)
            .await?
            .is_some()
        {
            return Err(AppError::new(ErrorCode::ProductNameExists));
        }

        // Category must exist and be active
        if let Some(category) = &category_id {
            self.categories
                .find_active(category)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CategoryInactive))?;
        }

        let selling = selling_price(mrp, discount);
        let product = Product {
            id: None,
            seller_id: seller,
            name,
            description: payload.description.unwrap_or_default(),
            mrp,
            discount,
            selling_price: selling,
            final_price: selling,
            quantity,
            category_id,
            bundle_ids: Vec::new(),
            discounts: Vec::new(),
            admin_discount: None,
            is_active: true,
            is_deleted: false,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };

        let created = self.products.create(product).await?;

        // Maintain the category back-reference once the product id exists
        if let (Some(category), Some(id)) = (&created.category_id, &created.id) {
            self.categories.push_product_ref(category, id).await?;
        }

        Ok(created)
    }

    /// Partial update.
    ///
    /// 提供的字段按创建规则重新校验；`selling_price` 以合并后的
    /// (新值优先，否则存量值) mrp/discount 重算，绝不会用过期组合。
    pub async fn update(
        &self,
        user: &CurrentUser,
        product_id: &str,
        payload: ProductUpdate,
        now: i64,
    ) -> AppResult<Product> {
        let id = parse_record_id("product", product_id)
            .map_err(|_| AppError::validation("Invalid product ID format"))?;
        let seller = seller_record(user);

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut product = self
            .products
            .find_by_id(&id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        if product.seller_id != seller {
            return Err(AppError::forbidden("You do not own this product"));
        }

        // Re-validate any provided field with the same rules as create
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)
                .map_err(|_| AppError::validation("Invalid or missing product name"))?;
            if *name != product.name
                && self
                    .products
                    .find_by_name_for_seller(name, &seller)
                    .await?
                    .is_some()
            {
                return Err(AppError::new(ErrorCode::ProductNameExists));
            }
        }
        validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)
            .map_err(|_| AppError::validation("Invalid product description"))?;
        if let Some(mrp) = payload.mrp {
            validate_positive_price(mrp, "MRP")?;
        }
        if let Some(discount) = payload.discount {
            validate_percentage(discount, "discount")?;
        }
        if let Some(quantity) = payload.quantity {
            validate_positive_quantity(quantity, "quantity")?;
        }

        let new_category = payload
            .category_id
            .as_deref()
            .map(|c| parse_record_id("category", c))
            .transpose()
            .map_err(|_| AppError::validation("Invalid category ID format"))?;

        if let Some(category) = &new_category {
            self.categories
                .find_active(category)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CategoryInactive))?;
        }

        // Apply fields
        let old_category = product.category_id.clone();
        if let Some(name) = payload.name {
            product.name = name;
        }
        if let Some(description) = payload.description {
            product.description = description;
        }
        if let Some(mrp) = payload.mrp {
            product.mrp = mrp;
        }
        if let Some(discount) = payload.discount {
            product.discount = discount;
        }
        if let Some(quantity) = payload.quantity {
            product.quantity = quantity;
        }
        if let Some(category) = new_category.clone() {
            product.category_id = Some(category);
        }

        // Recompute derived prices from the resulting values and persist
        self.engine.reprice_product(&mut product, now).await?;

        // Migrate the category back-reference if it changed
        if let Some(new_cat) = &new_category
            && old_category.as_ref() != Some(new_cat)
        {
            if let Some(old_cat) = &old_category {
                self.categories.pull_product_ref(old_cat, &id).await?;
            }
            self.categories.push_product_ref(new_cat, &id).await?;
        }

        Ok(product)
    }

    /// Soft delete with the cascading unit:
    /// 1. mark deleted, 2. pull from every bundle membership, 3. reprice the
    /// affected bundles from their remaining members, 4. pull the category
    /// back-reference.
    ///
    /// 每一步都是幂等的：级联中途失败后重放收敛到同一终态，
    /// 且商品在第一步就不再可见。
    pub async fn delete(&self, user: &CurrentUser, product_id: &str, now: i64) -> AppResult<()> {
        let id = parse_record_id("product", product_id)
            .map_err(|_| AppError::validation("Invalid product ID format"))?;
        let seller = seller_record(user);

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut product = self
            .products
            .find_by_id(&id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        if product.seller_id != seller {
            return Err(AppError::forbidden("You do not own this product"));
        }

        // 1. Mark deleted first so the product never stays visible while
        //    bundles still reference it
        product.is_deleted = true;
        product.updated_at = now;
        self.products.save(&product).await?;

        // 2. Remove from every bundle membership
        let affected = self.bundles.pull_member(&id).await?;

        // 3. Reprice each affected bundle from its remaining members,
        //    even if it became empty (MRP 0)
        for mut bundle in affected {
            self.engine.reprice_bundle(&mut bundle, now).await?;
        }

        // 4. Pull the category back-reference
        if let Some(category) = &product.category_id {
            self.categories.pull_product_ref(category, &id).await?;
        }

        tracing::info!(product = %id, "Product marked as deleted and removed from bundles");
        Ok(())
    }

    /// Load an owned, non-deleted product or fail with NotFound/Forbidden
    pub async fn get_owned(&self, user: &CurrentUser, id: &RecordId) -> AppResult<Product> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        if product.seller_id != seller_record(user) {
            return Err(AppError::forbidden("You do not own this product"));
        }
        Ok(product)
    }
}
