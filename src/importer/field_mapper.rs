// ==========================================
// 企业地址批量导入系统 - 字段映射器实现
// ==========================================
// 职责: 源列（含别名） → 标准字段
// 说明: 不做类型转换; 注册号保留原始文本, 由校验器判定
// ==========================================

use crate::domain::import::{ImportField, ImportRow};
use crate::importer::company_importer_trait::FieldMapper as FieldMapperTrait;
use crate::importer::file_parser::RawRow;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_row(&self, row: &RawRow) -> ImportRow {
        ImportRow {
            index: row.index(),
            name: self.get_string(row, ImportField::Name),
            registration_number: self.get_string(row, ImportField::RegistrationNumber),
            street: self.get_string(row, ImportField::Street),
            city: self.get_string(row, ImportField::City),
            postal_code: self.get_string(row, ImportField::PostalCode),
            country: self.get_string(row, ImportField::Country),
        }
    }
}

impl FieldMapper {
    /// 提取字符串字段（空白 → None）
    fn get_string(&self, row: &RawRow, field: ImportField) -> Option<String> {
        row.field(field)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }
}
