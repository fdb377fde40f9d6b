//! Product Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key, record_link};
use crate::db::models::Product;

const PRODUCT_TABLE: &str = "product";

/// 列表查询参数 (搜索 / 排序 / 分页)
#[derive(Debug, Clone)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub sort_by: String,
    pub ascending: bool,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: "created_at".to_string(),
            ascending: true,
            page: 1,
            limit: 10,
        }
    }
}

/// 允许作为排序键的字段白名单 (防止拼接注入)
const SORTABLE_FIELDS: &[&str] = &["name", "mrp", "selling_price", "created_at", "updated_at"];

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id (regardless of lifecycle flags)
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self
            .base
            .db()
            .select((PRODUCT_TABLE, record_key(id)))
            .await?;
        Ok(product)
    }

    /// Find products by id set; filters to sellable products, optionally
    /// restricted to one seller
    pub async fn find_sellable_by_ids(
        &self,
        ids: &[RecordId],
        seller_id: Option<&RecordId>,
    ) -> RepoResult<Vec<Product>> {
        let keys: Vec<String> = ids.iter().map(record_key).collect();
        let mut query = String::from(
            "SELECT * FROM product WHERE record::id(id) IN $keys \
             AND is_active = true AND is_deleted = false AND is_blocked = false",
        );
        if seller_id.is_some() {
            query.push_str(" AND seller_id = $seller");
        }

        let mut q = self.base.db().query(query).bind(("keys", keys));
        if let Some(seller) = seller_id {
            q = q.bind(("seller", record_link(seller)));
        }

        let products: Vec<Product> = q.await?.take(0)?;
        Ok(products)
    }

    /// Duplicate-name check within one seller's catalog
    pub async fn find_by_name_for_seller(
        &self,
        name: &str,
        seller_id: &RecordId,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM product \
                 WHERE name = $name AND seller_id = $seller AND is_deleted = false LIMIT 1",
            )
            .bind(("name", name.to_string()))
            .bind(("seller", record_link(seller_id)))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Seller catalog listing with search, sorting and pagination
    pub async fn find_for_seller(
        &self,
        seller_id: &RecordId,
        query: &ProductListQuery,
    ) -> RepoResult<(Vec<Product>, u64)> {
        let sort_by = if SORTABLE_FIELDS.contains(&query.sort_by.as_str()) {
            query.sort_by.as_str()
        } else {
            "created_at"
        };
        let order = if query.ascending { "ASC" } else { "DESC" };
        let limit = query.limit.clamp(1, 100) as i64;
        let start = (query.page.max(1) as i64 - 1) * limit;

        let mut filter =
            String::from("seller_id = $seller AND is_deleted = false");
        if query.search.is_some() {
            filter.push_str(" AND string::lowercase(name) CONTAINS string::lowercase($search)");
        }

        let select = format!(
            "SELECT * FROM product WHERE {filter} ORDER BY {sort_by} {order} LIMIT $limit START $start"
        );
        let count = format!("SELECT count() AS total FROM product WHERE {filter} GROUP ALL");

        let mut q = self
            .base
            .db()
            .query(select)
            .query(count)
            .bind(("seller", record_link(seller_id)))
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(search) = &query.search {
            q = q.bind(("search", search.clone()));
        }

        let mut result = q.await?;
        let products: Vec<Product> = result.take(0)?;

        #[derive(serde::Deserialize)]
        struct Count {
            total: u64,
        }
        let counts: Vec<Count> = result.take(1)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        Ok((products, total))
    }

    /// Create a new product
    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Persist the full product document
    pub async fn save(&self, product: &Product) -> RepoResult<Product> {
        let id = product
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("Product has no id".to_string()))?;
        self.base
            .save_content(PRODUCT_TABLE, &record_key(id), product)
            .await
    }

    /// Strip a bundle back-reference from every product that carries it
    pub async fn pull_bundle_ref(&self, bundle_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE product SET bundle_ids -= $bundle WHERE bundle_ids CONTAINS $bundle")
            .bind(("bundle", record_link(bundle_id)))
            .await?
            .check()?;
        Ok(())
    }

    /// Append a bundle back-reference to the given products
    pub async fn push_bundle_ref(
        &self,
        product_ids: &[RecordId],
        bundle_id: &RecordId,
    ) -> RepoResult<()> {
        let keys: Vec<String> = product_ids.iter().map(record_key).collect();
        self.base
            .db()
            .query(
                "UPDATE product SET bundle_ids += $bundle \
                 WHERE record::id(id) IN $keys AND bundle_ids CONTAINSNOT $bundle",
            )
            .bind(("bundle", record_link(bundle_id)))
            .bind(("keys", keys))
            .await?
            .check()?;
        Ok(())
    }

    /// Remove a bundle back-reference from a single product
    pub async fn pull_bundle_ref_for_product(
        &self,
        product_id: &RecordId,
        bundle_id: &RecordId,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE type::thing($tb, $key) SET bundle_ids -= $bundle")
            .bind(("tb", PRODUCT_TABLE))
            .bind(("key", record_key(product_id)))
            .bind(("bundle", record_link(bundle_id)))
            .await?
            .check()?;
        Ok(())
    }

    /// Strip a discount cross-reference from every product that carries it.
    /// Returns the affected products for repricing.
    pub async fn pull_discount_ref(&self, discount_id: &RecordId) -> RepoResult<Vec<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE product SET discounts -= $discount \
                 WHERE discounts CONTAINS $discount RETURN AFTER",
            )
            .bind(("discount", record_link(discount_id)))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }
}
