//! 工具模块
//!
//! - [`error`] - 统一错误类型和响应结构
//! - [`logger`] - 日志初始化
//! - [`time`] - 业务时区日期转换
//! - [`currency`] - 金额显示格式化

pub mod currency;
pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
