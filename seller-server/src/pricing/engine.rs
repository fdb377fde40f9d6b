//! Repricing Engine
//!
//! The single place where derived price fields are recomputed and written
//! back. Every mutation site (product/bundle/discount/sale services) goes
//! through these helpers instead of re-implementing the invariants inline.

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Bundle, DiscountTarget, Product};
use crate::db::repository::{BundleRepository, DiscountRepository, ProductRepository};
use shared::{AppError, AppResult};

use super::calculator::{calculate_final_price, selling_price, to_decimal, to_f64};

/// Recompute-and-save engine for derived price fields
///
/// 不变量:
/// - product: `selling_price = mrp * (1 - discount/100)`,
///   `final_price = fold(active discounts over selling_price)`
/// - bundle: `mrp = Σ member.mrp * qty` (以当前可解析成员为准),
///   `selling_price = mrp * (1 - discount/100)`,
///   `final_price` 与 product 同一折算机制
#[derive(Clone)]
pub struct RepricingEngine {
    products: ProductRepository,
    bundles: BundleRepository,
    discounts: DiscountRepository,
}

impl RepricingEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            bundles: BundleRepository::new(db.clone()),
            discounts: DiscountRepository::new(db),
        }
    }

    /// Recompute a product's derived prices from its own fields and attached
    /// discounts, then persist.
    pub async fn reprice_product(&self, product: &mut Product, now: i64) -> AppResult<()> {
        product.selling_price = selling_price(product.mrp, product.discount);

        let discounts = self
            .discounts
            .find_by_ids_ordered(&product.discounts)
            .await?;
        product.final_price = calculate_final_price(product.selling_price, &discounts, now);
        product.updated_at = now;

        *product = self.products.save(product).await?;
        Ok(())
    }

    /// Recompute a bundle's aggregates from the current prices of its
    /// members, then persist.
    ///
    /// A member that no longer resolves (deleted concurrently) contributes
    /// zero rather than aborting the whole recomputation; the skip is logged.
    pub async fn reprice_bundle(&self, bundle: &mut Bundle, now: i64) -> AppResult<()> {
        let mut mrp_acc = Decimal::ZERO;

        for line in &bundle.products {
            match self.products.find_by_id(&line.product_id).await? {
                Some(product) if !product.is_deleted => {
                    mrp_acc += to_decimal(product.mrp) * Decimal::from(line.quantity);
                }
                _ => {
                    tracing::warn!(
                        bundle = %bundle.name,
                        product = %line.product_id,
                        "Bundle member did not resolve, contributes zero to aggregate"
                    );
                }
            }
        }

        bundle.mrp = to_f64(mrp_acc);
        bundle.selling_price = selling_price(bundle.mrp, bundle.discount);

        let discounts = self.discounts.find_by_ids_ordered(&bundle.discounts).await?;
        bundle.final_price = calculate_final_price(bundle.selling_price, &discounts, now);
        bundle.updated_at = now;

        *bundle = self.bundles.save(bundle).await?;
        Ok(())
    }

    /// Recompute the derived prices of whatever entity a discount targets.
    pub async fn reprice_target(&self, target: &DiscountTarget, now: i64) -> AppResult<()> {
        match target {
            DiscountTarget::Product { id } => {
                let mut product = self
                    .products
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::new(shared::ErrorCode::ProductNotFound))?;
                self.reprice_product(&mut product, now).await
            }
            DiscountTarget::Bundle { id } => {
                let mut bundle = self
                    .bundles
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::new(shared::ErrorCode::BundleNotFound))?;
                self.reprice_bundle(&mut bundle, now).await
            }
        }
    }
}
