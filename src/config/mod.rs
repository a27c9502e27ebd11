// ==========================================
// 发货包装系统 - 配置层
// ==========================================
// 职责: 包装全局配置的读取与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod packaging_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader::{ConfigResult, PackagingConfigReader};
pub use packaging_config::PackagingConfig;
