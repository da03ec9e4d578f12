// ==========================================
// 企业地址批量导入系统 - 导入层
// ==========================================
// 职责: 表格数据 → 企业/地址对账落库
// 流程: 解析 → 映射 → 校验 → 对账（每行一个事务）→ 汇总
// ==========================================

// 模块声明
pub mod company_importer_impl;
pub mod company_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod reconciler;
pub mod report;
pub mod result_aggregator;
pub mod validator;

// 重导出核心类型
pub use company_importer_impl::CompanyImporterImpl;
pub use error::{ImportError, ImporterResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvRowParser, RawRow, RowStream};
pub use reconciler::{PersistedState, Reconciler, RowOutcome};
pub use report::ImportReport;
pub use result_aggregator::ResultAggregator;
pub use validator::RecordValidator;

// 重导出 Trait 接口
pub use company_importer_trait::{CompanyImporter, FieldMapper};
