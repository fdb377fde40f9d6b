//! Seller Profile Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key, record_link};
use crate::db::models::SellerProfile;

const SELLER_PROFILE_TABLE: &str = "seller_profile";

// =============================================================================
// Seller Profile Repository
// =============================================================================

#[derive(Clone)]
pub struct SellerProfileRepository {
    base: BaseRepository,
}

impl SellerProfileRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the profile belonging to a platform user (unique per user)
    pub async fn find_by_user(&self, user_id: &RecordId) -> RepoResult<Option<SellerProfile>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM seller_profile WHERE user_id = $user LIMIT 1")
            .bind(("user", record_link(user_id)))
            .await?;
        let profiles: Vec<SellerProfile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Create a new profile
    pub async fn create(&self, profile: SellerProfile) -> RepoResult<SellerProfile> {
        let created: Option<SellerProfile> = self
            .base
            .db()
            .create(SELLER_PROFILE_TABLE)
            .content(profile)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create seller profile".to_string()))
    }

    /// Persist the full profile document
    pub async fn save(&self, profile: &SellerProfile) -> RepoResult<SellerProfile> {
        let id = profile
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Seller profile has no id".to_string()))?;
        self.base
            .save_content(SELLER_PROFILE_TABLE, &record_key(id), profile)
            .await
    }
}
