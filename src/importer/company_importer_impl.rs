// ==========================================
// 企业地址批量导入系统 - 企业导入器实现
// ==========================================
// 职责: 整合导入流程，从表格到数据库
// 流程: 读取配置 → 解析 → 映射 → 逐行对账（每行一个事务）→ 汇总
// 红线: 单线程顺序处理, 行按源顺序对账
// ==========================================

use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::import::ImportResult;
use crate::importer::company_importer_trait::{CompanyImporter, FieldMapper};
use crate::importer::error::ImporterResult;
use crate::importer::file_parser::{CsvRowParser, RowStream};
use crate::importer::reconciler::Reconciler;
use crate::importer::result_aggregator::ResultAggregator;
use crate::importer::validator::RecordValidator;
use crate::repository::CompanyRepository;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument, Span};
use uuid::Uuid;

// ==========================================
// CompanyImporterImpl - 企业导入器实现
// ==========================================
pub struct CompanyImporterImpl<R, C>
where
    R: CompanyRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: R,

    // 配置读取器（每次导入开始时读取）
    config: C,

    // 导入组件
    field_mapper: Box<dyn FieldMapper>,
}

impl<R, C> CompanyImporterImpl<R, C>
where
    R: CompanyRepository,
    C: ImportConfigReader,
{
    /// 创建新的 CompanyImporter 实例
    ///
    /// # 参数
    /// - repo: 企业仓储
    /// - config: 配置读取器
    /// - field_mapper: 字段映射器
    pub fn new(repo: R, config: C, field_mapper: Box<dyn FieldMapper>) -> Self {
        Self {
            repo,
            config,
            field_mapper,
        }
    }

    /// 底层仓储（用于导入后查询/生成报告）
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 驱动 解析 → 对账 → 汇总
    #[instrument(skip_all, fields(run_id))]
    fn run<Rd: Read>(&self, rows: RowStream<Rd>, config: &ImportConfig) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        Span::current().record("run_id", run_id.as_str());

        info!(
            run_id = %run_id,
            locale = %config.locale,
            columns = rows.headers().len(),
            "开始导入企业数据"
        );

        let reconciler = Reconciler::new(
            RecordValidator::new(config.locale.clone()).with_trim_values(config.trim_whitespace),
        );
        let mut aggregator = ResultAggregator::new();

        for raw in rows {
            let raw = raw.map_err(|e| {
                error!(error = %e, "输入读取失败, 导入中止");
                e
            })?;

            let row = self.field_mapper.map_row(&raw);
            let outcome = reconciler.reconcile_row(&self.repo, &row).map_err(|e| {
                error!(index = row.index, error = %e, "存储故障, 导入中止");
                e
            })?;

            aggregator.record(outcome);
        }

        info!(
            run_id = %run_id,
            total_rows = aggregator.processed_rows(),
            imported = aggregator.imported_count(),
            invalid = aggregator.invalid_count(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "企业数据导入完成"
        );

        Ok(aggregator.finish())
    }
}

impl<R, C> CompanyImporter for CompanyImporterImpl<R, C>
where
    R: CompanyRepository,
    C: ImportConfigReader,
{
    fn import_from_reader<Rd: Read>(&self, source: Rd) -> ImporterResult<ImportResult> {
        let config = self.config.load_import_config()?;
        let rows = CsvRowParser::new(&config).parse(source)?;
        self.run(rows, &config)
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    fn import_from_path<P: AsRef<Path>>(&self, path: P) -> ImporterResult<ImportResult> {
        let config = self.config.load_import_config()?;
        let rows = CsvRowParser::new(&config).open_path(path.as_ref()).map_err(|e| {
            error!(error = %e, "文件打开失败");
            e
        })?;
        self.run(rows, &config)
    }
}
