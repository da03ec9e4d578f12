// ==========================================
// 企业地址批量导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config::{ImportConfig, ImportConfigReader};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::i18n::{available_locales, is_supported_locale};
use crate::importer::error::{ImportError, ImporterResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（调用方负责建表）
    pub fn new(db_path: &str) -> ImporterResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImporterResult<Self> {
        {
            let conn_guard = Self::lock(&conn, "*")?;
            configure_sqlite_connection(&conn_guard).map_err(|e| ImportError::ConfigReadError {
                key: "*".to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(Self { conn })
    }

    fn lock<'a>(
        conn: &'a Arc<Mutex<Connection>>,
        key: &str,
    ) -> ImporterResult<MutexGuard<'a, Connection>> {
        conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ImporterResult<Option<String>> {
        let conn = Self::lock(&self.conn, key)?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImporterResult<()> {
        let conn = Self::lock(&self.conn, key)?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(config_key = key, value, "配置已写入");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式, 按 key 排序）
    pub fn get_config_snapshot(&self) -> ImporterResult<String> {
        let conn = Self::lock(&self.conn, "*")?;
        let read_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")
            .map_err(read_err)?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(read_err)?;

        for row in rows {
            let (key, value) = row.map_err(read_err)?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map)).map_err(|e| ImportError::InternalError(e.to_string()))
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ImporterResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// 配置值解析
// ==========================================

fn value_error(key: &str, value: &str, message: impl Into<String>) -> ImportError {
    ImportError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> ImporterResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(value_error(key, value, "期望 true/false/1/0/yes/no")),
    }
}

fn parse_delimiter(key: &str, value: &str) -> ImporterResult<u8> {
    match value {
        "\\t" | "\t" | "tab" | "TAB" => return Ok(b'\t'),
        _ => {}
    }

    let bytes = value.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii() && bytes[0] != b'"' && bytes[0] != b'\n' {
        Ok(bytes[0])
    } else {
        Err(value_error(key, value, "期望单个 ASCII 字符"))
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_csv_delimiter(&self) -> ImporterResult<u8> {
        let value = self.get_config_or_default(config_keys::CSV_DELIMITER, ",")?;
        parse_delimiter(config_keys::CSV_DELIMITER, &value)
    }

    fn get_trim_whitespace(&self) -> ImporterResult<bool> {
        let value = self.get_config_or_default(config_keys::TRIM_WHITESPACE, "true")?;
        parse_bool(config_keys::TRIM_WHITESPACE, &value)
    }

    fn get_skip_blank_rows(&self) -> ImporterResult<bool> {
        let value = self.get_config_or_default(config_keys::SKIP_BLANK_ROWS, "false")?;
        parse_bool(config_keys::SKIP_BLANK_ROWS, &value)
    }

    fn get_locale(&self) -> ImporterResult<String> {
        let default = ImportConfig::default().locale;
        let value = self.get_config_or_default(config_keys::LOCALE, &default)?;
        let value = value.trim().to_string();

        if !is_supported_locale(&value) {
            return Err(value_error(
                config_keys::LOCALE,
                &value,
                format!("可用语言: {}", available_locales().join(", ")),
            ));
        }
        Ok(value)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const CSV_DELIMITER: &str = "import.csv_delimiter";
    pub const TRIM_WHITESPACE: &str = "import.trim_whitespace";
    pub const SKIP_BLANK_ROWS: &str = "import.skip_blank_rows";
    pub const LOCALE: &str = "import.locale";
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 COMPANY_IMPORT_DB_PATH（非空时）
/// - 用户数据目录/company-import/company_import.db
/// - 回退: ./company_import.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("COMPANY_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./company_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("company-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("company_import.db");
        }
    }

    path.to_string_lossy().to_string()
}
