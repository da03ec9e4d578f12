// ==========================================
// 企业地址批量导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、导入瞬态对象、结构化错误
// 红线: 不含数据访问逻辑,不含对账逻辑
// ==========================================

pub mod company;
pub mod import;
pub mod validation;

// 重导出核心类型
pub use company::{
    Address, AddressDraft, AddressKey, Company, CompanyDraft, CompanyWithAddresses, NewAddress,
    NewCompany, NAME_MAX_LENGTH,
};
pub use import::{ImportField, ImportResult, ImportRow, InvalidRowRecord};
pub use validation::{FieldErrors, BASE_FIELD};
