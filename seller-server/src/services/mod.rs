//! Business Services
//!
//! 实体管理器：每个服务封装一种实体的写路径 (校验 → 级联 → 派生价格重算)。
//! 读路径 (列表/详情) 由 API handler 直接走 repository。
//!
//! 写序列化约定：服务在"读取-计算-写回"前以主实体 ID 取得
//! [`crate::core::EntityLocks`] 的锁；级联步骤设计为幂等，可安全重试。

pub mod bundle;
pub mod discount;
pub mod product;
pub mod sale;

#[cfg(test)]
mod tests;

pub use bundle::BundleService;
pub use discount::DiscountService;
pub use product::ProductService;
pub use sale::SaleService;

use surrealdb::RecordId;

use crate::auth::CurrentUser;

/// 当前用户对应的卖家记录链接 ("seller:<user id>")
pub fn seller_record(user: &CurrentUser) -> RecordId {
    RecordId::from_table_key("seller", &user.id)
}
