//! Bundle Service
//!
//! Bundles aggregate member products into a single priced unit. Every
//! membership mutation recomputes `mrp`/`selling_price` from the members'
//! live prices and keeps the product↔bundle back-references consistent.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::{EntityLocks, ServerState};
use crate::db::models::{Bundle, BundleCreate, BundleLine, BundleLineInput, BundleUpdate, Product};
use crate::db::repository::{BundleRepository, DiscountRepository, ProductRepository};
use crate::pricing::RepricingEngine;
use crate::pricing::calculator::{to_decimal, to_f64};
use crate::pricing::selling_price;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, parse_record_id, validate_percentage,
    validate_required_text,
};
use shared::{AppError, AppResult, ErrorCode};

use super::seller_record;

#[derive(Clone)]
pub struct BundleService {
    bundles: BundleRepository,
    products: ProductRepository,
    discounts: DiscountRepository,
    engine: RepricingEngine,
    locks: Arc<EntityLocks>,
}

/// A parsed membership line from the API
struct ParsedLine {
    product_id: RecordId,
    quantity: i64,
}

impl BundleService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            bundles: BundleRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            discounts: DiscountRepository::new(db.clone()),
            engine: RepricingEngine::new(db),
            locks: state.entity_locks.clone(),
        }
    }

    fn parse_lines(lines: &[BundleLineInput]) -> AppResult<Vec<ParsedLine>> {
        let mut invalid = Vec::new();
        let mut parsed = Vec::with_capacity(lines.len());
        for line in lines {
            let raw = line.product_id.as_deref().unwrap_or_default();
            match parse_record_id("product", raw) {
                Ok(product_id) => parsed.push(ParsedLine {
                    product_id,
                    quantity: line.quantity.unwrap_or(1),
                }),
                Err(_) => invalid.push(raw.to_string()),
            }
        }
        if !invalid.is_empty() {
            return Err(AppError::validation(format!(
                "Invalid product IDs: {}",
                invalid.join(", ")
            )));
        }
        if parsed.iter().any(|l| l.quantity <= 0) {
            return Err(AppError::validation(
                "Invalid quantities: Quantities must be positive numbers",
            ));
        }
        Ok(parsed)
    }

    /// Fetch the sellable products for the given ids, failing with Forbidden
    /// if any id does not resolve to an owned, sellable product.
    ///
    /// 管理员角色跳过所有权过滤。
    async fn load_members(
        &self,
        user: &CurrentUser,
        ids: &[RecordId],
    ) -> AppResult<Vec<Product>> {
        let seller = seller_record(user);
        let owner_filter = (!user.is_admin()).then_some(&seller);
        let owned = self.products.find_sellable_by_ids(ids, owner_filter).await?;
        if owned.len() != ids.len() {
            return Err(AppError::forbidden(
                "Unauthorized to bundle one or more products \
                 or products are not active, deleted, or blocked",
            ));
        }
        Ok(owned)
    }

    /// Aggregate MRP from loaded members: Σ member.mrp * quantity
    fn aggregate_mrp(members: &[Product], lines: &[ParsedLine]) -> f64 {
        let mut acc = Decimal::ZERO;
        for line in lines {
            if let Some(product) = members
                .iter()
                .find(|p| p.id.as_ref() == Some(&line.product_id))
            {
                acc += to_decimal(product.mrp) * Decimal::from(line.quantity);
            }
        }
        to_f64(acc)
    }

    /// Create a bundle from a set of member products.
    ///
    /// 全部成员必须归属调用者且可售；任一不合格商品使整个创建失败
    /// (不产生部分捆绑包)。反向引用在捆绑包 ID 存在后写入。
    pub async fn create(
        &self,
        user: &CurrentUser,
        payload: BundleCreate,
        now: i64,
    ) -> AppResult<Bundle> {
        let name = payload
            .name
            .ok_or_else(|| AppError::validation("Invalid name: Name is required"))?;
        validate_required_text(&name, "name", MAX_NAME_LEN)
            .map_err(|_| AppError::validation("Invalid name: Name is required"))?;

        let description = payload
            .description
            .ok_or_else(|| AppError::validation("Invalid description: Description is required"))?;
        validate_required_text(&description, "description", MAX_DESCRIPTION_LEN)
            .map_err(|_| AppError::validation("Invalid description: Description is required"))?;

        let discount = payload
            .discount
            .ok_or_else(|| AppError::validation("Invalid discount: Discount must be a number between 0 and 100"))?;
        validate_percentage(discount, "discount")?;

        let lines = payload.products.unwrap_or_default();
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::BundleEmpty));
        }
        let parsed = Self::parse_lines(&lines)?;

        // No duplicate member entries
        let mut seen = HashSet::new();
        if !parsed.iter().all(|l| seen.insert(l.product_id.clone())) {
            return Err(AppError::new(ErrorCode::BundleDuplicateProduct));
        }

        let ids: Vec<RecordId> = parsed.iter().map(|l| l.product_id.clone()).collect();
        let members = self.load_members(user, &ids).await?;

        let mrp = Self::aggregate_mrp(&members, &parsed);
        let selling = selling_price(mrp, discount);

        let bundle = Bundle {
            id: None,
            seller_id: seller_record(user),
            name,
            description,
            mrp,
            discount,
            selling_price: selling,
            final_price: selling,
            products: parsed
                .iter()
                .map(|l| BundleLine {
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            discounts: Vec::new(),
            admin_discount: None,
            is_active: true,
            is_deleted: false,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };

        let created = self.bundles.create(bundle).await?;

        // Back-references must carry the persisted bundle id
        if let Some(bundle_id) = &created.id {
            self.products.push_bundle_ref(&ids, bundle_id).await?;
        }

        Ok(created)
    }

    /// Partial update.
    ///
    /// 提供 `products` 时为追加语义：新成员与现有成员合并；
    /// 已在捆绑包中的商品 ID 使整个请求被拒绝，捆绑包保持不变。
    pub async fn update(
        &self,
        user: &CurrentUser,
        bundle_id: &str,
        payload: BundleUpdate,
        now: i64,
    ) -> AppResult<Bundle> {
        let id = parse_record_id("bundle", bundle_id)
            .map_err(|_| AppError::validation("Invalid bundle ID format"))?;

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut bundle = self
            .bundles
            .find_live(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BundleNotFound))?;

        if user.is_seller() && bundle.seller_id != seller_record(user) {
            return Err(AppError::forbidden("Unauthorized to update this bundle"));
        }

        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(discount) = payload.discount {
            validate_percentage(discount, "discount")?;
        }

        if let Some(lines) = &payload.products
            && !lines.is_empty()
        {
            let parsed = Self::parse_lines(lines)?;

            // Reject ids already present in the bundle, leaving it unchanged
            let existing: HashSet<RecordId> = bundle
                .products
                .iter()
                .map(|l| l.product_id.clone())
                .collect();
            if parsed.iter().any(|l| existing.contains(&l.product_id)) {
                return Err(AppError::new(ErrorCode::BundleDuplicateProduct));
            }

            // Validate ownership and active-state of the union of old + new
            let union: Vec<RecordId> = bundle
                .products
                .iter()
                .map(|l| l.product_id.clone())
                .chain(parsed.iter().map(|l| l.product_id.clone()))
                .collect();
            self.load_members(user, &union).await?;

            let new_ids: Vec<RecordId> = parsed.iter().map(|l| l.product_id.clone()).collect();
            bundle.products.extend(parsed.iter().map(|l| BundleLine {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
            }));

            self.products.push_bundle_ref(&new_ids, &id).await?;
        }

        if let Some(name) = payload.name {
            bundle.name = name;
        }
        if let Some(description) = payload.description {
            bundle.description = description;
        }
        if let Some(discount) = payload.discount {
            bundle.discount = discount;
        }

        // Recompute aggregates over the merged membership with the resulting
        // discount, from the members' live prices
        self.engine.reprice_bundle(&mut bundle, now).await?;

        Ok(bundle)
    }

    /// Remove a single product from a bundle and reprice from the remaining
    /// members' live prices.
    pub async fn remove_product(
        &self,
        user: &CurrentUser,
        bundle_id: &str,
        product_id: &str,
        now: i64,
    ) -> AppResult<Bundle> {
        let id = parse_record_id("bundle", bundle_id)
            .map_err(|_| AppError::validation("Invalid bundle ID format"))?;
        let product = parse_record_id("product", product_id)
            .map_err(|_| AppError::validation("Invalid product ID format"))?;

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut bundle = self
            .bundles
            .find_live(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BundleNotFound))?;

        if bundle.seller_id != seller_record(user) {
            return Err(AppError::forbidden("Unauthorized to update this bundle"));
        }

        let index = bundle
            .products
            .iter()
            .position(|l| l.product_id == product)
            .ok_or_else(|| AppError::new(ErrorCode::BundleProductMissing))?;
        bundle.products.remove(index);

        self.engine.reprice_bundle(&mut bundle, now).await?;

        // Clear the back-reference on the removed product
        self.products
            .pull_bundle_ref_for_product(&product, &id)
            .await?;

        Ok(bundle)
    }

    /// Soft delete: unset the bundle reference on every member product and
    /// cascade-delete the discounts attached to this bundle.
    pub async fn delete(&self, user: &CurrentUser, bundle_id: &str, now: i64) -> AppResult<()> {
        let id = parse_record_id("bundle", bundle_id)
            .map_err(|_| AppError::validation("Invalid bundle ID format"))?;

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut bundle = self
            .bundles
            .find_live(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BundleNotFound))?;

        if bundle.seller_id != seller_record(user) {
            return Err(AppError::forbidden("Unauthorized to delete this bundle"));
        }

        bundle.is_deleted = true;
        bundle.updated_at = now;
        self.bundles.save(&bundle).await?;

        // Unset the back-reference on every member product
        self.products.pull_bundle_ref(&id).await?;

        // Cascade: discounts attached to this bundle are deleted with it
        for discount in self.discounts.find_for_target(&id).await? {
            if let Some(discount_id) = &discount.id {
                self.discounts.delete(discount_id).await?;
            }
        }

        tracing::info!(bundle = %id, "Bundle deleted");
        Ok(())
    }
}
