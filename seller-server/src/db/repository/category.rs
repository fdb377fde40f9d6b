//! Category Repository

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key, record_link};
use crate::db::models::Category;

const CATEGORY_TABLE: &str = "category";

/// 分类列表查询参数
#[derive(Debug, Clone)]
pub struct CategoryListQuery {
    pub search: Option<String>,
    pub sort_by: String,
    pub ascending: bool,
    pub page: u32,
    pub limit: u32,
}

impl Default for CategoryListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: "name".to_string(),
            ascending: true,
            page: 1,
            limit: 10,
        }
    }
}

const SORTABLE_FIELDS: &[&str] = &["name", "created_at"];

// =============================================================================
// Category Repository
// =============================================================================

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Category>> {
        let category: Option<Category> = self
            .base
            .db()
            .select((CATEGORY_TABLE, record_key(id)))
            .await?;
        Ok(category)
    }

    /// Find an active category by id
    pub async fn find_active(&self, id: &RecordId) -> RepoResult<Option<Category>> {
        Ok(self.find_by_id(id).await?.filter(|c| c.is_active))
    }

    /// Active categories with search, sorting and pagination
    pub async fn find_all_active(
        &self,
        query: &CategoryListQuery,
    ) -> RepoResult<(Vec<Category>, u64)> {
        let sort_by = if SORTABLE_FIELDS.contains(&query.sort_by.as_str()) {
            query.sort_by.as_str()
        } else {
            "name"
        };
        let order = if query.ascending { "ASC" } else { "DESC" };
        let limit = query.limit.clamp(1, 100) as i64;
        let start = (query.page.max(1) as i64 - 1) * limit;

        let mut filter = String::from("is_active = true");
        if query.search.is_some() {
            filter.push_str(" AND string::lowercase(name) CONTAINS string::lowercase($search)");
        }

        let select = format!(
            "SELECT * FROM category WHERE {filter} ORDER BY {sort_by} {order} LIMIT $limit START $start"
        );
        let count = format!("SELECT count() AS total FROM category WHERE {filter} GROUP ALL");

        let mut q = self
            .base
            .db()
            .query(select)
            .query(count)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(search) = &query.search {
            q = q.bind(("search", search.clone()));
        }

        let mut result = q.await?;
        let categories: Vec<Category> = result.take(0)?;

        #[derive(serde::Deserialize)]
        struct Count {
            total: u64,
        }
        let counts: Vec<Count> = result.take(1)?;
        let total = counts.first().map(|c| c.total).unwrap_or(0);

        Ok((categories, total))
    }

    /// Create a new category
    pub async fn create(&self, category: Category) -> RepoResult<Category> {
        let created: Option<Category> = self
            .base
            .db()
            .create(CATEGORY_TABLE)
            .content(category)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Append a product back-reference
    pub async fn push_product_ref(
        &self,
        category_id: &RecordId,
        product_id: &RecordId,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE type::thing($tb, $key) SET product_ids += $product \
                 WHERE product_ids CONTAINSNOT $product",
            )
            .bind(("tb", CATEGORY_TABLE))
            .bind(("key", record_key(category_id)))
            .bind(("product", record_link(product_id)))
            .await?
            .check()?;
        Ok(())
    }

    /// Remove a product back-reference
    pub async fn pull_product_ref(
        &self,
        category_id: &RecordId,
        product_id: &RecordId,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE type::thing($tb, $key) SET product_ids -= $product")
            .bind(("tb", CATEGORY_TABLE))
            .bind(("key", record_key(category_id)))
            .bind(("product", record_link(product_id)))
            .await?
            .check()?;
        Ok(())
    }
}
