// ==========================================
// 企业地址批量导入系统 - 导入配置
// ==========================================
// 职责: 定义导入配置值对象与读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::i18n::DEFAULT_LOCALE;
use crate::importer::error::ImporterResult;
use serde::Serialize;

// ==========================================
// ImportConfig - 单次导入使用的配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportConfig {
    pub csv_delimiter: u8,     // 列分隔符（单个 ASCII 字符）
    pub trim_whitespace: bool, // 是否去除单元格首尾空白
    pub skip_blank_rows: bool, // 是否跳过全空行（默认关闭; 跳过的行仍占用序号）
    pub locale: String,        // 校验消息语言
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: b',',
            trim_whitespace: true,
            skip_blank_rows: false,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 获取列分隔符
    ///
    /// # 默认值
    /// - ','
    fn get_csv_delimiter(&self) -> ImporterResult<u8>;

    /// 是否去除首尾空白
    ///
    /// # 默认值
    /// - true
    fn get_trim_whitespace(&self) -> ImporterResult<bool>;

    /// 是否跳过全空行（默认不跳过, 全空行交给校验报告为无效行）
    ///
    /// # 默认值
    /// - false
    fn get_skip_blank_rows(&self) -> ImporterResult<bool>;

    /// 获取校验消息语言（必须是已内置的语言）
    ///
    /// # 默认值
    /// - "en"
    fn get_locale(&self) -> ImporterResult<String>;

    /// 一次性读取完整导入配置
    fn load_import_config(&self) -> ImporterResult<ImportConfig> {
        Ok(ImportConfig {
            csv_delimiter: self.get_csv_delimiter()?,
            trim_whitespace: self.get_trim_whitespace()?,
            skip_blank_rows: self.get_skip_blank_rows()?,
            locale: self.get_locale()?,
        })
    }
}

// 静态配置（不读库, 用于嵌入调用与测试）
impl ImportConfigReader for ImportConfig {
    fn get_csv_delimiter(&self) -> ImporterResult<u8> {
        Ok(self.csv_delimiter)
    }

    fn get_trim_whitespace(&self) -> ImporterResult<bool> {
        Ok(self.trim_whitespace)
    }

    fn get_skip_blank_rows(&self) -> ImporterResult<bool> {
        Ok(self.skip_blank_rows)
    }

    fn get_locale(&self) -> ImporterResult<String> {
        Ok(self.locale.clone())
    }
}
