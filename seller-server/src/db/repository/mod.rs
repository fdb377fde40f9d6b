//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.
//!
//! # ID Convention
//!
//! 全栈统一使用 "table:id" 格式：
//!   - 解析: `utils::validation::parse_record_id("product", "product:abc")`
//!   - 获取表名: `id.table()`
//!   - 获取纯ID: `id.key().to_string()`
//!
//! 记录链接字段 (seller_id, category_id, bundle_ids, discounts, ...) 一律
//! 以 "table:id" 字符串形式持久化；查询绑定时同样使用字符串，保证比较一致。

pub mod bundle;
pub mod category;
pub mod discount;
pub mod product;
pub mod sale;
pub mod seller;

// Re-exports
pub use bundle::BundleRepository;
pub use category::CategoryRepository;
pub use discount::DiscountRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use seller::SellerProfileRepository;

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for shared::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => {
                shared::AppError::with_message(shared::ErrorCode::NotFound, msg)
            }
            RepoError::Duplicate(msg) => shared::AppError::conflict(msg),
            RepoError::Validation(msg) => shared::AppError::validation(msg),
            RepoError::Database(msg) => shared::AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 记录的纯 key ("table:id" → "id")
pub fn record_key(id: &RecordId) -> String {
    id.key().to_string()
}

/// 记录的完整链接形式 ("table:id")，用于持久化与查询绑定
pub fn record_link(id: &RecordId) -> String {
    id.to_string()
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// 以完整文档内容保存实体 (mongoose `doc.save()` 的等价物)
    ///
    /// `id` 字段从内容中剥离，记录通过 `table:key` 定位。
    pub async fn save_content<T>(&self, table: &str, key: &str, entity: &T) -> RepoResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let mut data = serde_json::to_value(entity)
            .map_err(|e| RepoError::Database(format!("Serialization failed: {e}")))?;
        if let Some(obj) = data.as_object_mut() {
            obj.remove("id");
        }

        let mut result = self
            .db
            .query("UPDATE type::thing($tb, $key) CONTENT $data RETURN AFTER")
            .bind(("tb", table.to_string()))
            .bind(("key", key.to_string()))
            .bind(("data", data))
            .await?;
        let rows: Vec<T> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("{table}:{key} not found")))
    }
}
