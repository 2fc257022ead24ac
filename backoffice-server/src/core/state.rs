use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::repository::SqliteFactSource;

/// 服务器状态 - 所有 handler 共享的单例引用
///
/// 使用 Clone 浅拷贝：`SqlitePool` 内部是 Arc，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 嵌入式数据库连接池 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SQLite)
    pub pool: SqlitePool,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self { config, pool }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录结构存在
    /// 2. 打开数据库并应用 schema
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        let pool = crate::db::init_pool(&db_path.to_string_lossy()).await?;

        Ok(Self::new(config.clone(), pool))
    }

    /// 只读事实源，基于共享连接池
    pub fn fact_source(&self) -> SqliteFactSource {
        SqliteFactSource::new(self.pool.clone())
    }
}
