// ==========================================
// 企业地址批量导入系统 - 配置层
// ==========================================
// 职责: 导入配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_db_path, ConfigManager};
pub use import_config::{ImportConfig, ImportConfigReader};
