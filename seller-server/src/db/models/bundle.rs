//! Bundle Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// A single membership line of a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Bundle model
///
/// 价格派生字段约定:
/// - `mrp == Σ member.mrp * quantity`，在成员列表、折扣或任一成员价格
///   变化后立即重算 (过期即 bug)
/// - `selling_price == mrp * (1 - discount/100)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub seller_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Derived: aggregate list price of the members
    pub mrp: f64,
    /// Bundle-level discount percentage (0-100)
    #[serde(default)]
    pub discount: f64,
    /// Derived: mrp after the bundle discount
    pub selling_price: f64,
    /// Derived: selling_price after folding currently active discounts
    #[serde(default)]
    pub final_price: f64,
    /// Member products; product ids are unique within a bundle
    #[serde(default)]
    pub products: Vec<BundleLine>,
    /// Attached discount records, in application order
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub discounts: Vec<RecordId>,
    /// Sale discount percentage currently applied, recorded for reversal
    #[serde(default)]
    pub admin_discount: Option<f64>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_blocked: bool,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Bundle {
    /// 捆绑包是否可被修改/参与促销
    pub fn is_sellable(&self) -> bool {
        self.is_active && !self.is_deleted && !self.is_blocked
    }

    /// 是否包含指定商品
    pub fn contains_product(&self, product_id: &RecordId) -> bool {
        self.products.iter().any(|p| &p.product_id == product_id)
    }
}

/// Bundle line as received over the API
#[derive(Debug, Clone, Deserialize)]
pub struct BundleLineInput {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Create bundle payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub products: Option<Vec<BundleLineInput>>,
}

/// Update bundle payload (partial)
///
/// `products` 中出现的商品会被追加到现有成员中；
/// 已经是成员的商品 ID 会使整个请求被拒绝。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub products: Option<Vec<BundleLineInput>>,
}
