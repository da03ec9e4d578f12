// ==========================================
// 企业地址批量导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 范围: 仅致命错误（中止整批）; 行级错误以 FieldErrors 形式留在对账引擎内
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.tsv/.txt）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败 ({position}): {message}")]
    CsvParseError { position: String, message: String },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        let position = match err.position() {
            Some(pos) => format!("line {}, record {}", pos.line(), pos.record()),
            None => "unknown".to_string(),
        };

        if let csv::ErrorKind::Io(io_err) = err.kind() {
            return ImportError::FileReadError(io_err.to_string());
        }

        ImportError::CsvParseError {
            position,
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;
