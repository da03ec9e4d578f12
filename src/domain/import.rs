// ==========================================
// 企业地址批量导入系统 - 导入领域模型
// ==========================================
// 职责: 导入行 / 无效行记录 / 导入结果
// 红线: ImportResult 只在整批完成后产出, 产出后不可变
// ==========================================

use crate::domain::company::{AddressDraft, CompanyDraft};
use crate::domain::validation::FieldErrors;
use serde::Serialize;
use std::collections::BTreeSet;

// ==========================================
// ImportField - 导入字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    Name,
    RegistrationNumber,
    Street,
    City,
    PostalCode,
    Country,
}

impl ImportField {
    pub const ALL: [ImportField; 6] = [
        ImportField::Name,
        ImportField::RegistrationNumber,
        ImportField::Street,
        ImportField::City,
        ImportField::PostalCode,
        ImportField::Country,
    ];

    /// 标准列名
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportField::Name => "name",
            ImportField::RegistrationNumber => "registration_number",
            ImportField::Street => "street",
            ImportField::City => "city",
            ImportField::PostalCode => "postal_code",
            ImportField::Country => "country",
        }
    }

    /// 可接受的列名别名（已规范化: 小写/下划线）
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ImportField::Name => &["name", "company_name"],
            ImportField::RegistrationNumber => {
                &["registration_number", "registration_no", "reg_number"]
            }
            ImportField::Street => &["street"],
            ImportField::City => &["city"],
            ImportField::PostalCode => &["postal_code", "zip", "zip_code", "postcode"],
            ImportField::Country => &["country"],
        }
    }

    /// 是否为持久化必填字段（postal_code 可空）
    pub fn is_required(&self) -> bool {
        !matches!(self, ImportField::PostalCode)
    }
}

// ==========================================
// ImportRow - 导入行（瞬态, 不持久化）
// ==========================================
// 形状校验已完成: 空值已归一为 None
// 业务规则（非空/数字/长度）由校验器负责
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub index: usize, // 数据行序号（0 起, 不含表头）
    pub name: Option<String>,
    pub registration_number: Option<String>, // 原始文本, 数字解析属于业务校验
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl ImportRow {
    /// 企业草稿（不含地址）
    pub fn company_draft(&self) -> CompanyDraft {
        CompanyDraft {
            name: self.name.clone(),
            registration_number: self.registration_number.clone(),
            addresses: Vec::new(),
        }
    }

    /// 地址草稿
    pub fn address_draft(&self) -> AddressDraft {
        AddressDraft {
            street: self.street.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

// ==========================================
// InvalidRowRecord - 无效行记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRowRecord {
    pub index: usize,        // 数据行序号
    pub detail: String,      // 完整消息以 ", " 拼接
    pub errors: FieldErrors, // 字段路径 → 消息列表
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// imported_company_ids: 去重集合, 不承诺顺序
// invalid_rows: 按行出现顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    imported_company_ids: BTreeSet<i64>,
    invalid_rows: Vec<InvalidRowRecord>,
}

impl ImportResult {
    pub(crate) fn new(
        imported_company_ids: BTreeSet<i64>,
        invalid_rows: Vec<InvalidRowRecord>,
    ) -> Self {
        Self {
            imported_company_ids,
            invalid_rows,
        }
    }

    pub fn imported_company_ids(&self) -> &BTreeSet<i64> {
        &self.imported_company_ids
    }

    pub fn invalid_rows(&self) -> &[InvalidRowRecord] {
        &self.invalid_rows
    }

    pub fn is_clean(&self) -> bool {
        self.invalid_rows.is_empty()
    }
}
