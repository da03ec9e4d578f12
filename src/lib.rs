// ==========================================
// 企业地址批量导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + CSV
// 系统定位: 表格数据导入引擎 (逐行事务, 行级失败隔离)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析/对账/汇总
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Address, Company, CompanyWithAddresses, FieldErrors, ImportField, ImportResult, ImportRow,
    InvalidRowRecord,
};

// 仓储
pub use repository::{CompanyRepository, CompanyStore, SqliteCompanyRepository};

// 导入器
pub use importer::{
    CompanyImporter, CompanyImporterImpl, ImportError, ImportReport, ImporterResult,
};

// 配置
pub use config::{ConfigManager, ImportConfig, ImportConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "企业地址批量导入系统";
