//! Bundle Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key, record_link};
use crate::db::models::Bundle;

const BUNDLE_TABLE: &str = "bundle";

// =============================================================================
// Bundle Repository
// =============================================================================

#[derive(Clone)]
pub struct BundleRepository {
    base: BaseRepository,
}

impl BundleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find bundle by id (regardless of lifecycle flags)
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Bundle>> {
        let bundle: Option<Bundle> = self.base.db().select((BUNDLE_TABLE, record_key(id))).await?;
        Ok(bundle)
    }

    /// Find a live (active, not deleted, not blocked) bundle by id
    pub async fn find_live(&self, id: &RecordId) -> RepoResult<Option<Bundle>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM bundle WHERE id = type::thing($tb, $key) \
                 AND is_active = true AND is_deleted = false AND is_blocked = false",
            )
            .bind(("tb", BUNDLE_TABLE))
            .bind(("key", record_key(id)))
            .await?;
        let bundles: Vec<Bundle> = result.take(0)?;
        Ok(bundles.into_iter().next())
    }

    /// All live bundles of a seller
    pub async fn find_for_seller(&self, seller_id: &RecordId) -> RepoResult<Vec<Bundle>> {
        let bundles: Vec<Bundle> = self
            .base
            .db()
            .query(
                "SELECT * FROM bundle WHERE seller_id = $seller AND is_deleted = false \
                 ORDER BY created_at DESC",
            )
            .bind(("seller", record_link(seller_id)))
            .await?
            .take(0)?;
        Ok(bundles)
    }

    /// Live bundles that contain the given product as a member.
    /// Optionally restricted to one seller.
    pub async fn find_containing_product(
        &self,
        product_id: &RecordId,
        seller_id: Option<&RecordId>,
    ) -> RepoResult<Vec<Bundle>> {
        let mut query = String::from(
            "SELECT * FROM bundle WHERE products.product_id CONTAINS $product \
             AND is_active = true AND is_deleted = false AND is_blocked = false",
        );
        if seller_id.is_some() {
            query.push_str(" AND seller_id = $seller");
        }

        let mut q = self
            .base
            .db()
            .query(query)
            .bind(("product", record_link(product_id)));
        if let Some(seller) = seller_id {
            q = q.bind(("seller", record_link(seller)));
        }

        let bundles: Vec<Bundle> = q.await?.take(0)?;
        Ok(bundles)
    }

    /// Create a new bundle
    pub async fn create(&self, bundle: Bundle) -> RepoResult<Bundle> {
        let created: Option<Bundle> = self.base.db().create(BUNDLE_TABLE).content(bundle).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create bundle".to_string()))
    }

    /// Persist the full bundle document
    pub async fn save(&self, bundle: &Bundle) -> RepoResult<Bundle> {
        let id = bundle
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Bundle has no id".to_string()))?;
        self.base
            .save_content(BUNDLE_TABLE, &record_key(id), bundle)
            .await
    }

    /// Remove a product from every bundle membership list that contains it.
    /// Returns the affected bundles (state after the pull) for repricing.
    pub async fn pull_member(&self, product_id: &RecordId) -> RepoResult<Vec<Bundle>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE bundle \
                 SET products = products[WHERE product_id != $product] \
                 WHERE products.product_id CONTAINS $product RETURN AFTER",
            )
            .bind(("product", record_link(product_id)))
            .await?;
        let bundles: Vec<Bundle> = result.take(0)?;
        Ok(bundles)
    }
}
