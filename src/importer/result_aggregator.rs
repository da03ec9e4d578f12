// ==========================================
// 企业地址批量导入系统 - 结果汇总器
// ==========================================
// 职责: 累积成功企业 id（去重）与无效行（按出现顺序）
// 红线: 只增不减; finish() 之后结果不可变
// ==========================================

use crate::domain::import::{ImportResult, InvalidRowRecord};
use crate::importer::reconciler::RowOutcome;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct ResultAggregator {
    imported_company_ids: BTreeSet<i64>,
    invalid_rows: Vec<InvalidRowRecord>,
    processed_rows: usize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录单行结果
    pub fn record(&mut self, outcome: RowOutcome) {
        self.processed_rows += 1;
        match outcome {
            RowOutcome::Persisted { company_id, .. } => {
                self.imported_company_ids.insert(company_id);
            }
            RowOutcome::Invalid(record) => {
                debug_assert!(
                    self.invalid_rows
                        .last()
                        .map_or(true, |last| last.index < record.index),
                    "invalid rows must be recorded in encounter order"
                );
                self.invalid_rows.push(record);
            }
        }
    }

    /// 已处理行数（不含跳过的空行）
    pub fn processed_rows(&self) -> usize {
        self.processed_rows
    }

    pub fn imported_count(&self) -> usize {
        self.imported_company_ids.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_rows.len()
    }

    /// 产出最终结果（消费汇总器）
    pub fn finish(self) -> ImportResult {
        ImportResult::new(self.imported_company_ids, self.invalid_rows)
    }
}
