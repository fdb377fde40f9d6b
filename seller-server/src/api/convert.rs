//! Response view types
//!
//! Internal documents are projected into display-friendly shapes before they
//! leave the API: record ids become "table:id" strings, timestamps become
//! RFC3339, and referenced entities are resolved into names.

use serde::Serialize;
use surrealdb::RecordId;

use crate::db::models::{Bundle, Discount, Product};
use crate::pricing::{DiscountState, state_at};
use crate::utils::time::millis_to_rfc3339;

/// Record id as "table:id" string (empty for unsaved entities)
pub fn id_string(id: &Option<RecordId>) -> String {
    id.as_ref().map(|i| i.to_string()).unwrap_or_default()
}

/// Discount projected for display
#[derive(Debug, Clone, Serialize)]
pub struct DiscountView {
    pub id: String,
    pub discount_type: crate::db::models::DiscountKind,
    pub discount_value: f64,
    pub start_date: String,
    pub end_date: String,
    pub state: DiscountState,
}

impl DiscountView {
    pub fn from_discount(discount: &Discount, now: i64) -> Self {
        Self {
            id: id_string(&discount.id),
            discount_type: discount.kind,
            discount_value: discount.value,
            start_date: millis_to_rfc3339(discount.start_at),
            end_date: millis_to_rfc3339(discount.end_at),
            state: state_at(discount.start_at, discount.end_at, now),
        }
    }
}

/// Product with its discounts resolved
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mrp: f64,
    pub discount: f64,
    pub selling_price: f64,
    pub final_price: f64,
    pub quantity: i64,
    pub category_id: Option<String>,
    pub bundle_ids: Vec<String>,
    pub discounts: Vec<DiscountView>,
    pub admin_discount: Option<f64>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductView {
    pub fn from_product(product: &Product, discounts: Vec<DiscountView>) -> Self {
        Self {
            id: id_string(&product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            mrp: product.mrp,
            discount: product.discount,
            selling_price: product.selling_price,
            final_price: product.final_price,
            quantity: product.quantity,
            category_id: product.category_id.as_ref().map(|c| c.to_string()),
            bundle_ids: product.bundle_ids.iter().map(|b| b.to_string()).collect(),
            discounts,
            admin_discount: product.admin_discount,
            is_active: product.is_active,
            created_at: millis_to_rfc3339(product.created_at),
            updated_at: millis_to_rfc3339(product.updated_at),
        }
    }
}

/// A bundle member with its product name resolved
#[derive(Debug, Clone, Serialize)]
pub struct BundleMemberView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

/// Bundle with member product names resolved
#[derive(Debug, Clone, Serialize)]
pub struct BundleView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mrp: f64,
    pub discount: f64,
    pub selling_price: f64,
    pub final_price: f64,
    pub products: Vec<BundleMemberView>,
    pub admin_discount: Option<f64>,
    pub is_active: bool,
    pub created_at: String,
}

impl BundleView {
    /// `resolve_name` maps member product ids to display names; unresolvable
    /// members fall back to "Unknown Product".
    pub fn from_bundle(bundle: &Bundle, resolve_name: impl Fn(&RecordId) -> Option<String>) -> Self {
        Self {
            id: id_string(&bundle.id),
            name: bundle.name.clone(),
            description: bundle.description.clone(),
            mrp: bundle.mrp,
            discount: bundle.discount,
            selling_price: bundle.selling_price,
            final_price: bundle.final_price,
            products: bundle
                .products
                .iter()
                .map(|line| BundleMemberView {
                    product_id: line.product_id.to_string(),
                    product_name: resolve_name(&line.product_id)
                        .unwrap_or_else(|| "Unknown Product".to_string()),
                    quantity: line.quantity,
                })
                .collect(),
            admin_discount: bundle.admin_discount,
            is_active: bundle.is_active,
            created_at: millis_to_rfc3339(bundle.created_at),
        }
    }
}
