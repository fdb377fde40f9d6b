//! Discount Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key, record_link};
use crate::db::models::Discount;

const DISCOUNT_TABLE: &str = "discount";

// =============================================================================
// Discount Repository
// =============================================================================

#[derive(Clone)]
pub struct DiscountRepository {
    base: BaseRepository,
}

impl DiscountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find discount by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Discount>> {
        let discount: Option<Discount> = self
            .base
            .db()
            .select((DISCOUNT_TABLE, record_key(id)))
            .await?;
        Ok(discount)
    }

    /// Load discounts by id set, preserving the order of `ids`.
    ///
    /// Ids that no longer resolve are silently skipped — callers fold over
    /// whatever still exists.
    pub async fn find_by_ids_ordered(&self, ids: &[RecordId]) -> RepoResult<Vec<Discount>> {
        let keys: Vec<String> = ids.iter().map(record_key).collect();
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE record::id(id) IN $keys")
            .bind(("keys", keys))
            .await?
            .take(0)?;

        // Restore caller order (array order determines fold order)
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(d) = discounts
                .iter()
                .find(|d| d.id.as_ref() == Some(id))
            {
                ordered.push(d.clone());
            }
        }
        Ok(ordered)
    }

    /// All discounts attached to the given target entity
    pub async fn find_for_target(&self, target_id: &RecordId) -> RepoResult<Vec<Discount>> {
        let discounts: Vec<Discount> = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE target.id = $target")
            .bind(("target", record_link(target_id)))
            .await?
            .take(0)?;
        Ok(discounts)
    }

    /// Create a new discount
    pub async fn create(&self, discount: Discount) -> RepoResult<Discount> {
        let created: Option<Discount> = self
            .base
            .db()
            .create(DISCOUNT_TABLE)
            .content(discount)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create discount".to_string()))
    }

    /// Persist the full discount document
    pub async fn save(&self, discount: &Discount) -> RepoResult<Discount> {
        let id = discount
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Discount has no id".to_string()))?;
        self.base
            .save_content(DISCOUNT_TABLE, &record_key(id), discount)
            .await
    }

    /// Hard delete a discount record
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<Discount> = self
            .base
            .db()
            .delete((DISCOUNT_TABLE, record_key(id)))
            .await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Discount {id} not found")));
        }
        Ok(())
    }
}
