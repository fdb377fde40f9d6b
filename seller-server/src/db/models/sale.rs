//! Sale Model
//!
//! 管理员排期的促销活动；卖家将自己的商品/捆绑包加入活动。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Per-category discount configured on a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCategory {
    #[serde(with = "serde_helpers::record_id")]
    pub category_id: RecordId,
    /// Discount percentage (0-100) applied to products of this category
    pub discount: f64,
}

/// A product participating in a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleProduct {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
}

/// A bundle participating in a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleBundle {
    #[serde(with = "serde_helpers::record_id")]
    pub bundle_id: RecordId,
}

/// Sale entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Sale window start (milliseconds since epoch)
    pub start_at: i64,
    /// Sale window end (milliseconds since epoch)
    pub end_at: i64,
    /// Categories covered by this sale with their discount percentages
    #[serde(default)]
    pub categories: Vec<SaleCategory>,
    /// Participating products (seller opt-in)
    #[serde(default)]
    pub products: Vec<SaleProduct>,
    /// Participating bundles (populated when a member product opts in)
    #[serde(default)]
    pub bundles: Vec<SaleBundle>,
    /// Admin that scheduled the sale
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: RecordId,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_deleted: bool,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
}

impl Sale {
    /// 指定分类的促销折扣百分比 (未覆盖返回 None)
    pub fn discount_for_category(&self, category_id: &RecordId) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| &c.category_id == category_id)
            .map(|c| c.discount)
    }

    /// 商品是否已在活动中
    pub fn contains_product(&self, product_id: &RecordId) -> bool {
        self.products.iter().any(|p| &p.product_id == product_id)
    }

    /// 捆绑包是否已在活动中
    pub fn contains_bundle(&self, bundle_id: &RecordId) -> bool {
        self.bundles.iter().any(|b| &b.bundle_id == bundle_id)
    }
}

/// Category entry as received over the API
#[derive(Debug, Clone, Deserialize)]
pub struct SaleCategoryInput {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
}

/// Create sale payload (admin only)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC3339 date-time
    #[serde(default)]
    pub start_date: Option<String>,
    /// RFC3339 date-time
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<SaleCategoryInput>>,
}

/// Product entry for the seller opt-in endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SaleProductInput {
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Seller opt-in payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleAddProducts {
    #[serde(default)]
    pub products: Option<Vec<SaleProductInput>>,
}

/// Seller opt-out payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleRemoveProducts {
    #[serde(default)]
    pub product_ids: Option<Vec<String>>,
}
