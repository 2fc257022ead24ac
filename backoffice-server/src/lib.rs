//! Backoffice Report Server - 餐饮门店后台报表节点
//!
//! # 架构概述
//!
//! 本模块是报表服务的主入口，提供以下核心功能：
//!
//! - **班次对账** (`reporting::reconcile`): 结班点钞与差异计算
//! - **余额总账** (`reporting::ledger`): 按支付方式的三流水合账
//! - **期间损益** (`reporting::pnl`): 权责发生制 P&L
//! - **数据库** (`db`): 嵌入式 SQLite 存储
//! - **HTTP API** (`api`): RESTful 报表接口
//!
//! # 模块结构
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── reporting/     # 报表核心 (纯计算 + 事实源接口)
//! ├── db/            # 数据库层和 repository
//! └── utils/         # 错误、日志、时间、货币工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod reporting;
pub mod utils;

// Re-export 公共类型
pub use self::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> std::io::Result<Config> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    Ok(config)
}
