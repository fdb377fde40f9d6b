//! Sale Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::Sale;

const SALE_TABLE: &str = "sale";

// =============================================================================
// Sale Repository
// =============================================================================

#[derive(Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find sale by id (including deleted)
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        let sale: Option<Sale> = self.base.db().select((SALE_TABLE, record_key(id))).await?;
        Ok(sale)
    }

    /// Find a non-deleted sale by id
    pub async fn find_live(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        Ok(self.find_by_id(id).await?.filter(|s| !s.is_deleted))
    }

    /// Find a non-deleted sale that is ongoing or upcoming at `now`
    pub async fn find_visible(&self, id: &RecordId, now: i64) -> RepoResult<Option<Sale>> {
        Ok(self.find_live(id).await?.filter(|s| s.end_at > now))
    }

    /// Create a new sale
    pub async fn create(&self, sale: Sale) -> RepoResult<Sale> {
        let created: Option<Sale> = self.base.db().create(SALE_TABLE).content(sale).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create sale".to_string()))
    }

    /// Persist the full sale document
    pub async fn save(&self, sale: &Sale) -> RepoResult<Sale> {
        let id = sale
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Sale has no id".to_string()))?;
        self.base.save_content(SALE_TABLE, &record_key(id), sale).await
    }
}
