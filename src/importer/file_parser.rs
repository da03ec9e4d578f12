// ==========================================
// 企业地址批量导入系统 - 行解析器实现
// ==========================================
// 职责: 分隔符表格 → 惰性、单遍、有限的 (index, 字段映射) 序列
// 红线: 只在输入不可读/损坏时失败; 行内容问题留给对账引擎
// 红线: index 为数据行序号（0 起, 不含表头）, 跳过的空行同样占用序号
// ==========================================

use crate::config::ImportConfig;
use crate::domain::import::ImportField;
use crate::importer::error::{ImportError, ImporterResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace, warn};

/// 支持的文件扩展名（无扩展名同样接受）
const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// 规范化列名: 去 BOM / 去首尾空白 / 小写 / 空格与连字符转下划线
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

// ==========================================
// RawRow - 原始行（列名 → 值）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    index: usize,
    values: HashMap<String, String>,
}

impl RawRow {
    pub fn new(index: usize, values: HashMap<String, String>) -> Self {
        Self { index, values }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 按列名取值（列名同样经过规范化, "Postal Code" 与 "postal_code" 等价）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_header(key)).map(String::as_str)
    }

    /// 按标准字段取值（依次尝试别名, 优先返回非空值）
    pub fn field(&self, field: ImportField) -> Option<&str> {
        let mut present = None;
        for alias in field.aliases() {
            if let Some(value) = self.values.get(*alias) {
                if !value.trim().is_empty() {
                    return Some(value.as_str());
                }
                present.get_or_insert(value.as_str());
            }
        }
        present
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

// ==========================================
// CsvRowParser - 分隔符表格解析器
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvRowParser {
    delimiter: u8,
    trim_whitespace: bool,
    skip_blank_rows: bool,
}

impl CsvRowParser {
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            delimiter: config.csv_delimiter,
            trim_whitespace: config.trim_whitespace,
            skip_blank_rows: config.skip_blank_rows,
        }
    }

    /// 从任意 Read 源创建行流（仅读取表头, 数据行按需读取）
    ///
    /// # 返回
    /// - Ok(RowStream): 空输入得到空流
    /// - Err(FileReadError / CsvParseError): 表头不可读
    pub fn parse<R: Read>(&self, source: R) -> ImporterResult<RowStream<R>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(if self.trim_whitespace { Trim::All } else { Trim::None })
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let missing_fields: Vec<ImportField> = ImportField::ALL
            .into_iter()
            .filter(|field| !field.aliases().iter().any(|a| headers.iter().any(|h| h == a)))
            .collect();

        if !headers.is_empty() {
            let (required, optional): (Vec<ImportField>, Vec<ImportField>) =
                missing_fields.iter().copied().partition(|f| f.is_required());
            if !required.is_empty() {
                let names: Vec<&str> = required.iter().map(|f| f.as_str()).collect();
                warn!(missing = ?names, "表头缺少必填字段, 相关行将在校验阶段失败");
            }
            if !optional.is_empty() {
                let names: Vec<&str> = optional.iter().map(|f| f.as_str()).collect();
                debug!(missing = ?names, "表头缺少可选字段");
            }
        }
        debug!(columns = headers.len(), "表头已读取");

        Ok(RowStream {
            reader,
            headers,
            missing_fields,
            record: StringRecord::new(),
            next_index: 0,
            skip_blank_rows: self.skip_blank_rows,
            finished: false,
        })
    }

    /// 打开文件并创建行流
    ///
    /// # 返回
    /// - Err(FileNotFound): 文件不存在
    /// - Err(UnsupportedFormat): 扩展名不是 csv/tsv/txt
    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> ImporterResult<RowStream<File>> {
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(ImportError::UnsupportedFormat(ext));
            }
        }

        let file = File::open(path)?;
        self.parse(file)
    }
}

// ==========================================
// RowStream - 惰性行流
// ==========================================
pub struct RowStream<R> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    missing_fields: Vec<ImportField>,
    record: StringRecord,
    next_index: usize,
    skip_blank_rows: bool,
    finished: bool,
}

impl<R: Read> RowStream<R> {
    /// 规范化后的表头
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 表头中缺失的标准字段
    pub fn missing_fields(&self) -> &[ImportField] {
        &self.missing_fields
    }

    fn build_row(&self, index: usize) -> RawRow {
        let mut values = HashMap::with_capacity(self.headers.len());
        // 多余的单元格忽略; 重复列名取第一列
        for (header, value) in self.headers.iter().zip(self.record.iter()) {
            if header.is_empty() {
                continue;
            }
            values
                .entry(header.clone())
                .or_insert_with(|| value.to_string());
        }
        RawRow::new(index, values)
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = ImporterResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            match self.reader.read_record(&mut self.record) {
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    // 损坏输入: 整批失败, 之后不再产出
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                Ok(true) => {
                    let index = self.next_index;
                    self.next_index += 1;

                    let row = self.build_row(index);
                    if self.skip_blank_rows && row.is_blank() {
                        trace!(index, "跳过空白行");
                        continue;
                    }
                    return Some(Ok(row));
                }
            }
        }
    }
}
