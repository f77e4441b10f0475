//! 共享库
//!
//! 统计登记工具共用的配置加载与日志初始化。

pub mod config;
pub mod observability;
