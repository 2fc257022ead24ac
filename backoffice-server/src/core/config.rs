use chrono_tz::Tz;

/// 服务器配置 - 后台报表节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/backoffice | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | BUSINESS_TIMEZONE | Asia/Ho_Chi_Minh | 营业时区 (报表日界) |
/// | CURRENCY_SYMBOL | ₫ | 金额展示符号 |
/// | PROFIT_TAX_RATE | 0.20 | 利润税率 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/backoffice HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 营业时区：所有报表窗口按此时区的本地日切分
    pub timezone: Tz,
    /// 金额展示符号
    pub currency_symbol: String,
    /// 利润税率 (仅对正的税前利润征收)
    pub tax_rate: f64,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/backoffice".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Ho_Chi_Minh),
            currency_symbol: std::env::var("CURRENCY_SYMBOL").unwrap_or_else(|_| "₫".into()),
            tax_rate: std::env::var("PROFIT_TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::reporting::pnl::DEFAULT_TAX_RATE),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 数据库文件路径 (work_dir/database/backoffice.db)
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir)
            .join("database")
            .join("backoffice.db")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_path().parent().unwrap_or_else(|| {
            std::path::Path::new(&self.work_dir)
        }))?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
