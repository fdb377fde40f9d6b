//! Discount Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Discount kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// Discount target: exactly one of product or bundle, enforced by construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiscountTarget {
    Product {
        #[serde(with = "serde_helpers::record_id")]
        id: RecordId,
    },
    Bundle {
        #[serde(with = "serde_helpers::record_id")]
        id: RecordId,
    },
}

impl DiscountTarget {
    /// The referenced record id regardless of target kind
    pub fn record_id(&self) -> &RecordId {
        match self {
            DiscountTarget::Product { id } => id,
            DiscountTarget::Bundle { id } => id,
        }
    }
}

/// Discount entity
///
/// 生命周期: `Pending` (start 在未来) → `Active` (now 在窗口内) → `Expired`。
/// 状态在每次触及折扣或其目标实体的读写时惰性求值，没有后台任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Owning seller
    #[serde(with = "serde_helpers::record_id")]
    pub seller_id: RecordId,
    /// The entity this discount applies to
    pub target: DiscountTarget,
    pub kind: DiscountKind,
    /// Percentage (0-100) for `percentage`, currency amount for `fixed`
    pub value: f64,
    /// Validity window start (milliseconds since epoch)
    pub start_at: i64,
    /// Validity window end (milliseconds since epoch, exclusive)
    pub end_at: i64,
    /// Derived on every save: whether the window contained "now" at save time
    #[serde(default)]
    pub is_active: bool,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

/// Create discount payload
///
/// `product_id` XOR `bundle_id`: 两者都给或都不给会被拒绝。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountCreate {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub discount_type: Option<DiscountKind>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    /// RFC3339 date-time
    #[serde(default)]
    pub start_date: Option<String>,
    /// RFC3339 date-time
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Update discount payload — overwrites type, value and validity window
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountUpdate {
    #[serde(default)]
    pub discount_type: Option<DiscountKind>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}
