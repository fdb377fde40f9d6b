//! Discount Service
//!
//! Discounts attach to exactly one product or bundle and carry a validity
//! window. Attachment to the target's `discounts` list is window-gated:
//! a discount outside its window is stored but not applied, and every
//! mutation re-evaluates validity against "now" before repricing the target.

use std::sync::Arc;

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::{EntityLocks, ServerState};
use crate::db::models::{Discount, DiscountCreate, DiscountKind, DiscountTarget, DiscountUpdate};
use crate::db::repository::{BundleRepository, DiscountRepository, ProductRepository};
use crate::pricing::{RepricingEngine, is_active_at};
use crate::utils::validation::{parse_record_id, validate_percentage};
use crate::utils::time::parse_rfc3339;
use shared::{AppError, AppResult, ErrorCode};

use super::seller_record;

#[derive(Clone)]
pub struct DiscountService {
    discounts: DiscountRepository,
    products: ProductRepository,
    bundles: BundleRepository,
    engine: RepricingEngine,
    locks: Arc<EntityLocks>,
}

/// Validated window + value fields shared by add and update
struct DiscountFields {
    kind: DiscountKind,
    value: f64,
    start_at: i64,
    end_at: i64,
}

impl DiscountService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            discounts: DiscountRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            bundles: BundleRepository::new(db.clone()),
            engine: RepricingEngine::new(db),
            locks: state.entity_locks.clone(),
        }
    }

    fn validate_fields(
        kind: Option<DiscountKind>,
        value: Option<f64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<DiscountFields> {
        let kind =
            kind.ok_or_else(|| AppError::validation("Invalid or missing discount type"))?;
        let value =
            value.ok_or_else(|| AppError::validation("Invalid or missing discount value"))?;
        match kind {
            DiscountKind::Percentage => validate_percentage(value, "discount value")?,
            DiscountKind::Fixed => {
                if !value.is_finite() || value <= 0.0 {
                    return Err(AppError::validation(
                        "Invalid discount value: must be a positive amount",
                    ));
                }
            }
        }

        let start = start_date
            .ok_or_else(|| AppError::validation("Invalid or missing start date"))?;
        let end = end_date.ok_or_else(|| AppError::validation("Invalid or missing end date"))?;
        let start_at = parse_rfc3339("start date", start)?;
        let end_at = parse_rfc3339("end date", end)?;
        if start_at >= end_at {
            return Err(AppError::new(ErrorCode::DiscountWindowInvalid));
        }

        Ok(DiscountFields {
            kind,
            value,
            start_at,
            end_at,
        })
    }

    /// Resolve the target reference and verify ownership.
    ///
    /// `product_id` XOR `bundle_id` — both or neither is rejected before any
    /// lookup happens.
    async fn resolve_target(
        &self,
        user: &CurrentUser,
        product_id: Option<&str>,
        bundle_id: Option<&str>,
    ) -> AppResult<DiscountTarget> {
        let target = match (product_id, bundle_id) {
            (Some(product), None) => DiscountTarget::Product {
                id: parse_record_id("product", product)
                    .map_err(|_| AppError::validation("Invalid product ID format"))?,
            },
            (None, Some(bundle)) => DiscountTarget::Bundle {
                id: parse_record_id("bundle", bundle)
                    .map_err(|_| AppError::validation("Invalid bundle ID format"))?,
            },
            _ => return Err(AppError::new(ErrorCode::DiscountTargetAmbiguous)),
        };

        let seller = seller_record(user);
        let owner = match &target {
            DiscountTarget::Product { id } => self
                .products
                .find_by_id(id)
                .await?
                .filter(|p| !p.is_deleted)
                .map(|p| p.seller_id),
            DiscountTarget::Bundle { id } => self
                .bundles
                .find_by_id(id)
                .await?
                .filter(|b| !b.is_deleted)
                .map(|b| b.seller_id),
        };

        match owner {
            None => Err(AppError::with_message(
                ErrorCode::NotFound,
                "Product or Bundle not found",
            )),
            Some(owner) if owner != seller => {
                Err(AppError::forbidden("You do not have access"))
            }
            Some(_) => Ok(target),
        }
    }

    /// Attach or detach the discount on its target according to the current
    /// window state, then reprice the target.
    async fn sync_target_attachment(&self, discount: &Discount, now: i64) -> AppResult<()> {
        let Some(discount_id) = &discount.id else {
            return Ok(());
        };
        let target_id = discount.target.record_id().clone();

        let _guard = self.locks.acquire(&target_id.to_string()).await;

        let currently_valid = is_active_at(discount.start_at, discount.end_at, now);

        match &discount.target {
            DiscountTarget::Product { id } => {
                let Some(mut product) = self.products.find_by_id(id).await? else {
                    return Ok(());
                };
                let present = product.discounts.contains(discount_id);
                if currently_valid && !present {
                    product.discounts.push(discount_id.clone());
                } else if !currently_valid && present {
                    product.discounts.retain(|d| d != discount_id);
                }
                self.engine.reprice_product(&mut product, now).await?;
            }
            DiscountTarget::Bundle { id } => {
                let Some(mut bundle) = self.bundles.find_by_id(id).await? else {
                    return Ok(());
                };
                let present = bundle.discounts.contains(discount_id);
                if currently_valid && !present {
                    bundle.discounts.push(discount_id.clone());
                } else if !currently_valid && present {
                    bundle.discounts.retain(|d| d != discount_id);
                }
                self.engine.reprice_bundle(&mut bundle, now).await?;
            }
        }
        Ok(())
    }

    /// Create a discount against a product XOR a bundle.
    ///
    /// 窗口当前有效时立即挂到目标并重算价格；未生效的折扣只存储，
    /// 等待 update 路径在窗口到达后挂载。
    pub async fn add(
        &self,
        user: &CurrentUser,
        payload: DiscountCreate,
        now: i64,
    ) -> AppResult<Discount> {
        let fields = Self::validate_fields(
            payload.discount_type,
            payload.discount_value,
            payload.start_date.as_deref(),
            payload.end_date.as_deref(),
        )?;
        let target = self
            .resolve_target(
                user,
                payload.product_id.as_deref(),
                payload.bundle_id.as_deref(),
            )
            .await?;

        let discount = Discount {
            id: None,
            seller_id: seller_record(user),
            target,
            kind: fields.kind,
            value: fields.value,
            start_at: fields.start_at,
            end_at: fields.end_at,
            is_active: is_active_at(fields.start_at, fields.end_at, now),
            created_at: now,
            updated_at: now,
        };

        let created = self.discounts.create(discount).await?;

        if created.is_active {
            self.sync_target_attachment(&created, now).await?;
        }

        Ok(created)
    }

    /// Overwrite type, value and validity window.
    ///
    /// 重新跑完整的有效性检查：改窗口可能在一次调用里同时完成
    /// 挂载或摘除 (取决于新日期相对 now 的位置)，不能假设单调迁移。
    pub async fn update(
        &self,
        user: &CurrentUser,
        discount_id: &str,
        payload: DiscountUpdate,
        now: i64,
    ) -> AppResult<Discount> {
        let id = parse_record_id("discount", discount_id)
            .map_err(|_| AppError::validation("Invalid discount ID"))?;

        let mut discount = self
            .discounts
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::DiscountNotFound))?;

        if discount.seller_id != seller_record(user) {
            return Err(AppError::forbidden("You do not own this discount"));
        }

        let fields = Self::validate_fields(
            payload.discount_type,
            payload.discount_value,
            payload.start_date.as_deref(),
            payload.end_date.as_deref(),
        )?;

        discount.kind = fields.kind;
        discount.value = fields.value;
        discount.start_at = fields.start_at;
        discount.end_at = fields.end_at;
        discount.is_active = is_active_at(fields.start_at, fields.end_at, now);
        discount.updated_at = now;

        let saved = self.discounts.save(&discount).await?;

        // Re-evaluate attachment and reprice the target either way
        self.sync_target_attachment(&saved, now).await?;

        Ok(saved)
    }

    /// Delete a discount, strip its references and reprice the entities that
    /// carried it.
    pub async fn remove(&self, user: &CurrentUser, discount_id: &str, now: i64) -> AppResult<()> {
        let id = parse_record_id("discount", discount_id)
            .map_err(|_| AppError::validation("Invalid discount ID"))?;

        let discount = self
            .discounts
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::DiscountNotFound))?;

        if discount.seller_id != seller_record(user) {
            return Err(AppError::forbidden("You do not own this discount"));
        }

        self.discounts.delete(&id).await?;

        // Strip the reference from every product that carries it (covers the
        // target and any stale cross-reference) and reprice each
        for mut product in self.products.pull_discount_ref(&id).await? {
            let _guard = self
                .locks
                .acquire(&product.id.as_ref().map(|i| i.to_string()).unwrap_or_default())
                .await;
            self.engine.reprice_product(&mut product, now).await?;
        }

        // Bundles hold their references in the same list-based scheme
        if let DiscountTarget::Bundle { id: bundle_id } = &discount.target {
            let _guard = self.locks.acquire(&bundle_id.to_string()).await;
            if let Some(mut bundle) = self.bundles.find_by_id(bundle_id).await? {
                if bundle.discounts.contains(&id) {
                    bundle.discounts.retain(|d| d != &id);
                    self.engine.reprice_bundle(&mut bundle, now).await?;
                }
            }
        }

        Ok(())
    }
}
