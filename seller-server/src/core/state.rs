use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use shared::AppResult;

/// 实体级写锁管理器
///
/// 使用 DashMap 为每个实体 ID 维护一把独立的异步互斥锁。
/// 所有"读取-计算-写回"序列必须先取得对应实体的锁，
/// 以避免并发写互相覆盖派生字段 (文档库无多文档事务)。
///
/// # 使用场景
///
/// 服务层在修改 Product / Bundle / Discount / Sale 前，
/// 以主实体的记录 ID 调用 [`EntityLocks::acquire`]，
/// guard 存活期间其他写者对同一实体排队等待。
#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl EntityLocks {
    /// 创建空的锁管理器
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// 取得指定实体的写锁
    ///
    /// 同一 ID 的后续调用将等待 guard 释放
    pub async fn acquire(&self, entity_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(entity_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是卖家后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | entity_locks | Arc<EntityLocks> | 实体级写锁 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 实体级写锁管理器
    pub entity_locks: Arc<EntityLocks>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 方法代替
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        entity_locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            entity_locks,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/seller.db)
    /// 3. JWT 服务与实体锁
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .map_err(|e| shared::AppError::internal(format!("Failed to create work dir: {e}")))?;

        // 1. Initialize DB
        let db_path = config.database_dir().join("seller.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let entity_locks = Arc::new(EntityLocks::new());

        Ok(Self::new(
            config.clone(),
            db_service.db,
            jwt_service,
            entity_locks,
        ))
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
