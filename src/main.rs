// ==========================================
// 企业地址批量导入系统 - 命令行入口
// ==========================================
// 用法: company-import <csv_path> [db_path]
// 输出: stdout 为 JSON 导入报告, 日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use company_import::config::{get_default_db_path, ConfigManager};
use company_import::db::{init_schema, open_sqlite_connection};
use company_import::importer::FieldMapperImpl;
use company_import::{
    logging, CompanyImporter, CompanyImporterImpl, ImportReport, SqliteCompanyRepository,
};
use std::sync::{Arc, Mutex};

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let csv_path = match args.next() {
        Some(path) => path,
        None => bail!("用法: company-import <csv_path> [db_path]"),
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", company_import::APP_NAME, company_import::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("数据库建表失败")?;

    // 配置与仓储共用同一连接
    let conn = Arc::new(Mutex::new(conn));
    let config = ConfigManager::from_connection(conn.clone())?;
    let repo = SqliteCompanyRepository::from_connection(conn);

    let importer = CompanyImporterImpl::new(repo, config, Box::new(FieldMapperImpl));
    let result = importer
        .import_from_path(&csv_path)
        .with_context(|| format!("导入失败: {}", csv_path))?;

    let report = ImportReport::build(importer.repository(), &result)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
