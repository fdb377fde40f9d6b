//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Product model
///
/// 价格派生字段约定:
/// - `selling_price == mrp * (1 - discount/100)` 在任何修改 mrp/discount 的写入后立即成立
/// - `final_price` 为 selling_price 按 `discounts` 中当前有效折扣依序折算后的价格，
///   每次写路径变更后同步重算，绝不允许过期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Record link to the owning seller
    #[serde(with = "serde_helpers::record_id")]
    pub seller_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Maximum retail price (undiscounted list price)
    pub mrp: f64,
    /// Seller discount percentage (0-100)
    #[serde(default)]
    pub discount: f64,
    /// Derived: mrp after the seller discount
    pub selling_price: f64,
    /// Derived: selling_price after folding currently active discounts
    #[serde(default)]
    pub final_price: f64,
    /// Stock on hand
    #[serde(default)]
    pub quantity: i64,
    /// Record link to category (at most one)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub category_id: Option<RecordId>,
    /// Bundles this product is a member of
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub bundle_ids: Vec<RecordId>,
    /// Attached discount records, in application order
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub discounts: Vec<RecordId>,
    /// Sale discount percentage currently applied to selling_price, recorded
    /// so the sale removal path can reverse it
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

impl Product {
    /// 商品是否可参与定价/捆绑/促销操作
    pub fn is_sellable(&self) -> bool {
        self.is_active && !self.is_deleted && !self.is_blocked
    }
}

/// Create product payload
///
/// 所有字段都是 Option: 校验在 service 层逐字段进行，
/// 并返回第一个失败字段的错误消息。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Category ID as string (e.g. "category:xxx")
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Update product payload (partial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mrp: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub category_id: Option<String>,
}
