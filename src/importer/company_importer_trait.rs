// ==========================================
// 企业地址批量导入系统 - 导入接口 Trait
// ==========================================
// 职责: 定义导入流水线各环节接口（不包含实现）
// ==========================================

use crate::domain::import::{ImportResult, ImportRow};
use crate::importer::error::ImporterResult;
use crate::importer::file_parser::RawRow;
use std::io::Read;
use std::path::Path;

// ==========================================
// CompanyImporter Trait
// ==========================================
// 用途: 企业/地址导入主接口
// 实现者: CompanyImporterImpl
pub trait CompanyImporter {
    /// 从任意可读源导入
    ///
    /// # 参数
    /// - source: 带表头的分隔符表格字节流
    ///
    /// # 返回
    /// - Ok(ImportResult): 整批完成后的不可变结果（行级失败在 invalid_rows 中）
    /// - Err: 输入不可读/损坏、基础设施故障（已提交的行保持提交）
    ///
    /// # 流程
    /// 1. 读取表头, 惰性读取数据行
    /// 2. 字段映射（空值 → None）
    /// 3. 每行一个事务执行对账
    /// 4. 汇总结果
    fn import_from_reader<R: Read>(&self, source: R) -> ImporterResult<ImportResult>;

    /// 从文件导入
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat): 文件检查失败
    fn import_from_path<P: AsRef<Path>>(&self, path: P) -> ImporterResult<ImportResult>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → 导入行（只做形状转换, 不做业务校验）
// 实现者: FieldMapper
pub trait FieldMapper {
    /// 将原始行映射为 ImportRow
    ///
    /// # 参数
    /// - row: 原始行（列名 → 值）
    ///
    /// # 返回
    /// - ImportRow: 空白值已归一为 None
    fn map_row(&self, row: &RawRow) -> ImportRow;
}
