//! Seller Profile Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Seller profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerProfile {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// The authenticated platform user this profile belongs to (unique)
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: RecordId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub shop_name: String,
    #[serde(default)]
    pub shop_description: String,
    pub address: String,
    pub shop_contact_number: String,
    pub business_license: String,
    pub tax_id: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Created timestamp (milliseconds since epoch)
    #[serde(default)]
    pub created_at: i64,
    /// Updated timestamp (milliseconds since epoch)
    #[serde(default)]
    pub updated_at: i64,
}

/// Create seller profile payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellerProfileCreate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub shop_description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub shop_contact_number: Option<String>,
    #[serde(default)]
    pub business_license: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Update seller profile payload (partial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellerProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub shop_description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub shop_contact_number: Option<String>,
    #[serde(default)]
    pub business_license: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}
