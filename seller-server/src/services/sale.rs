//! Sale Participation Service
//!
//! Sales are admin-scheduled, category-scoped promotional events. Sellers opt
//! products in; bundles containing an opted-in product ride along. A running
//! sale discounts the live selling price immediately (rounded to whole
//! units), recording the applied percentage for later reversal.

use std::sync::Arc;

use serde::Serialize;
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::core::{EntityLocks, ServerState};
use crate::db::models::{
    Sale, SaleAddProducts, SaleBundle, SaleCategory, SaleCreate, SaleProduct, SaleRemoveProducts,
};
use crate::db::repository::{
    BundleRepository, CategoryRepository, ProductRepository, SaleRepository,
};
use crate::pricing::{apply_sale_discount, revert_sale_discount};
use crate::utils::time::parse_rfc3339;
use crate::utils::validation::{
    MAX_NAME_LEN, parse_record_id, validate_percentage, validate_required_text,
};
use shared::{AppError, AppResult, ErrorCode};

use super::seller_record;

/// Outcome of a batch removal — partial success is reported, not aborted
#[derive(Debug, Default, Serialize)]
pub struct SaleRemovalReport {
    pub removed_products: Vec<String>,
    pub not_found_products: Vec<String>,
    pub removed_bundles: Vec<String>,
    pub updated_bundles: Vec<String>,
}

#[derive(Clone)]
pub struct SaleService {
    sales: SaleRepository,
    products: ProductRepository,
    bundles: BundleRepository,
    categories: CategoryRepository,
    locks: Arc<EntityLocks>,
}

impl SaleService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            sales: SaleRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            bundles: BundleRepository::new(db.clone()),
            categories: CategoryRepository::new(db),
            locks: state.entity_locks.clone(),
        }
    }

    /// Schedule a sale (admin only — enforced by the route guard).
    pub async fn create(
        &self,
        user: &CurrentUser,
        payload: SaleCreate,
        now: i64,
    ) -> AppResult<Sale> {
        let name = payload
            .name
            .ok_or_else(|| AppError::validation("Invalid or missing sale name"))?;
        validate_required_text(&name, "name", MAX_NAME_LEN)?;

        let start = payload
            .start_date
            .ok_or_else(|| AppError::validation("Invalid or missing start date"))?;
        let end = payload
            .end_date
            .ok_or_else(|| AppError::validation("Invalid or missing end date"))?;
        let start_at = parse_rfc3339("start date", &start)?;
        let end_at = parse_rfc3339("end date", &end)?;
        if start_at >= end_at {
            return Err(AppError::validation("Start date must be before end date"));
        }
        if end_at <= now {
            return Err(AppError::validation("End date must be in the future"));
        }

        let entries = payload.categories.unwrap_or_default();
        if entries.is_empty() {
            return Err(AppError::validation(
                "The categories field must be a non-empty array",
            ));
        }

        let mut categories = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw = entry.category_id.unwrap_or_default();
            let category_id = parse_record_id("category", &raw)
                .map_err(|_| AppError::validation(format!("Invalid category ID: {raw}")))?;
            let discount = entry
                .discount
                .ok_or_else(|| AppError::validation("Invalid or missing category discount"))?;
            validate_percentage(discount, "category discount")?;

            self.categories
                .find_active(&category_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CategoryInactive))?;

            categories.push(SaleCategory {
                category_id,
                discount,
            });
        }

        let sale = Sale {
            id: None,
            name,
            description: payload.description.unwrap_or_default(),
            start_at,
            end_at,
            categories,
            products: Vec::new(),
            bundles: Vec::new(),
            created_by: RecordId::from_table_key("admin", &user.id),
            is_deleted: false,
            created_at: now,
        };

        Ok(self.sales.create(sale).await?)
    }

    /// Seller opt-in: add products (and the bundles containing them) to a
    /// sale.
    ///
    /// 校验失败即整体拒绝 (重复成员 → Conflict, 分类不匹配 → 400)；
    /// 活动已开始时立即对新成员应用分类折扣 (取整) 并记录 admin_discount。
    pub async fn add_products(
        &self,
        user: &CurrentUser,
        sale_id: &str,
        payload: SaleAddProducts,
        now: i64,
    ) -> AppResult<Sale> {
        let id = parse_record_id("sale", sale_id)
            .map_err(|_| AppError::validation("Invalid sale ID"))?;
        let seller = seller_record(user);

        let entries = payload.products.unwrap_or_default();
        if entries.is_empty() {
            return Err(AppError::validation(
                "The products field must be a non-empty array",
            ));
        }

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut sale = self
            .sales
            .find_live(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))?;

        if sale.end_at <= now {
            return Err(AppError::with_message(
                ErrorCode::SaleEnded,
                "Cannot add products to a sale that has ended",
            ));
        }

        let mut new_products: Vec<SaleProduct> = Vec::new();
        let mut new_bundles: Vec<SaleBundle> = Vec::new();

        for entry in entries {
            let raw = entry.product_id.unwrap_or_default();
            let product_id = parse_record_id("product", &raw)
                .map_err(|_| AppError::validation(format!("Invalid product ID: {raw}")))?;

            if sale.contains_product(&product_id)
                || new_products.iter().any(|p| p.product_id == product_id)
            {
                return Err(AppError::with_message(
                    ErrorCode::SaleDuplicateProduct,
                    format!("Product with ID {raw} is already added to this sale"),
                ));
            }

            let product = self
                .products
                .find_by_id(&product_id)
                .await?
                .filter(|p| p.is_sellable() && p.seller_id == seller)
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ProductNotSellable,
                        format!(
                            "Product with ID {raw} is either inactive, deleted, blocked, \
                             or not owned by you"
                        ),
                    )
                })?;

            // Category scoping: the product must belong to one of the sale's
            // configured categories
            let in_scope = product
                .category_id
                .as_ref()
                .is_some_and(|c| sale.discount_for_category(c).is_some());
            if !in_scope {
                return Err(AppError::with_message(
                    ErrorCode::SaleCategoryMismatch,
                    format!(
                        "Product with ID {raw} does not belong to any of the sale's categories"
                    ),
                ));
            }

            new_products.push(SaleProduct {
                product_id: product_id.clone(),
            });

            // Bundles containing this product ride along if eligible and not
            // already participating
            for bundle in self
                .bundles
                .find_containing_product(&product_id, Some(&seller))
                .await?
            {
                let Some(bundle_id) = bundle.id.clone() else {
                    continue;
                };
                if sale.contains_bundle(&bundle_id)
                    || new_bundles.iter().any(|b| b.bundle_id == bundle_id)
                {
                    continue;
                }
                new_bundles.push(SaleBundle { bundle_id });
            }
        }

        sale.products.extend(new_products.iter().cloned());
        sale.bundles.extend(new_bundles.iter().cloned());
        let saved = self.sales.save(&sale).await?;

        // Apply discounts only if the sale is already running
        if saved.start_at <= now {
            self.apply_discounts_to_new_items(&saved, &new_products, &new_bundles, now)
                .await?;
        }

        Ok(saved)
    }

    /// Apply the category discount to newly added products, then reprice the
    /// newly added bundles from their members' (already discounted) selling
    /// prices with the maximum member-category discount.
    async fn apply_discounts_to_new_items(
        &self,
        sale: &Sale,
        new_products: &[SaleProduct],
        new_bundles: &[SaleBundle],
        now: i64,
    ) -> AppResult<()> {
        for entry in new_products {
            let Some(mut product) = self.products.find_by_id(&entry.product_id).await? else {
                tracing::warn!(product = %entry.product_id, "Sale member no longer resolves");
                continue;
            };

            let Some(discount) = product
                .category_id
                .as_ref()
                .and_then(|c| sale.discount_for_category(c))
            else {
                tracing::warn!(product = %entry.product_id, "No matching sale category");
                continue;
            };

            product.selling_price = apply_sale_discount(product.selling_price, discount);
            product.admin_discount = Some(discount);
            product.updated_at = now;
            self.products.save(&product).await?;
        }

        for entry in new_bundles {
            let Some(mut bundle) = self.bundles.find_by_id(&entry.bundle_id).await? else {
                continue;
            };

            let mut max_discount: f64 = 0.0;
            let mut total_selling = 0.0;

            for line in &bundle.products {
                let Some(product) = self.products.find_by_id(&line.product_id).await? else {
                    continue;
                };
                let discount = product
                    .category_id
                    .as_ref()
                    .and_then(|c| sale.discount_for_category(c))
                    .unwrap_or(0.0);
                max_discount = max_discount.max(discount);
                total_selling += product.selling_price;
            }

            bundle.selling_price = apply_sale_discount(total_selling, max_discount);
            bundle.admin_discount = Some(max_discount);
            bundle.updated_at = now;
            self.bundles.save(&bundle).await?;
        }

        Ok(())
    }

    /// Seller opt-out: remove products from a sale with partial-success
    /// reporting, reversing the applied discounts.
    pub async fn remove_products(
        &self,
        user: &CurrentUser,
        sale_id: &str,
        payload: SaleRemoveProducts,
        now: i64,
    ) -> AppResult<SaleRemovalReport> {
        let id = parse_record_id("sale", sale_id)
            .map_err(|_| AppError::validation("Invalid sale ID"))?;
        let seller = seller_record(user);

        let raw_ids = payload.product_ids.unwrap_or_default();
        if raw_ids.is_empty() {
            return Err(AppError::validation(
                "The product_ids field must be a non-empty array",
            ));
        }
        let mut product_ids = Vec::with_capacity(raw_ids.len());
        for raw in &raw_ids {
            product_ids.push(
                parse_record_id("product", raw)
                    .map_err(|_| AppError::validation(format!("Invalid product ID: {raw}")))?,
            );
        }

        let _guard = self.locks.acquire(&id.to_string()).await;

        let mut sale = self
            .sales
            .find_live(&id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))?;

        if sale.end_at <= now {
            return Err(AppError::new(ErrorCode::SaleEnded));
        }

        let mut report = SaleRemovalReport::default();

        for product_id in product_ids {
            let raw = product_id.to_string();

            // Ownership/liveness mismatches are collected, not fatal
            let Some(mut product) = self
                .products
                .find_by_id(&product_id)
                .await?
                .filter(|p| p.seller_id == seller && p.is_active && !p.is_deleted)
            else {
                report.not_found_products.push(raw);
                continue;
            };

            let Some(index) = sale
                .products
                .iter()
                .position(|p| p.product_id == product_id)
            else {
                report.not_found_products.push(raw);
                continue;
            };
            sale.products.remove(index);

            // Reverse the category discount that was applied on entry
            if let Some(discount) = product
                .category_id
                .as_ref()
                .and_then(|c| sale.discount_for_category(c))
            {
                product.selling_price = revert_sale_discount(product.selling_price, discount);
                product.admin_discount = None;
                product.updated_at = now;
                self.products.save(&product).await?;
            }

            report.removed_products.push(raw);

            // Bundles containing this product: drop single-member bundles
            // from the sale, reprice the rest from the remaining members
            for mut bundle in self
                .bundles
                .find_containing_product(&product_id, None)
                .await?
            {
                let Some(bundle_id) = bundle.id.clone() else {
                    continue;
                };

                if bundle.products.len() == 1 {
                    if let Some(pos) = sale.bundles.iter().position(|b| b.bundle_id == bundle_id)
                    {
                        sale.bundles.remove(pos);
                        report.removed_bundles.push(bundle_id.to_string());
                    }
                    continue;
                }

                let mut total = 0.0;
                for line in &bundle.products {
                    if line.product_id == product_id {
                        continue;
                    }
                    let Some(member) = self
                        .products
                        .find_by_id(&line.product_id)
                        .await?
                        .filter(|p| p.is_active && !p.is_deleted)
                    else {
                        continue;
                    };
                    let discount = member
                        .category_id
                        .as_ref()
                        .and_then(|c| sale.discount_for_category(c))
                        .unwrap_or(0.0);
                    total += revert_sale_discount(member.selling_price, discount);
                }

                bundle.selling_price = total;
                bundle.updated_at = now;
                self.bundles.save(&bundle).await?;
                report.updated_bundles.push(bundle_id.to_string());
            }
        }

        self.sales.save(&sale).await?;

        Ok(report)
    }
}
