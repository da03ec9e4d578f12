// ==========================================
// 企业地址批量导入系统 - 导入报告
// ==========================================
// 职责: ImportResult + 已导入企业（含全部地址）的展示视图
// ==========================================

use crate::domain::company::CompanyWithAddresses;
use crate::domain::import::{ImportResult, InvalidRowRecord};
use crate::repository::{CompanyRepository, RepositoryResult};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported_companies: Vec<CompanyWithAddresses>, // 按 id 升序
    pub invalid_rows: Vec<InvalidRowRecord>,
}

impl ImportReport {
    /// 根据导入结果查询企业详情
    pub fn build<R: CompanyRepository>(repo: &R, result: &ImportResult) -> RepositoryResult<Self> {
        let mut imported_companies = Vec::with_capacity(result.imported_company_ids().len());
        for &company_id in result.imported_company_ids() {
            match repo.find_company(company_id)? {
                Some(company) => imported_companies.push(company),
                None => warn!(company_id, "已导入的企业不存在（可能已被删除）"),
            }
        }

        Ok(Self {
            imported_companies,
            invalid_rows: result.invalid_rows().to_vec(),
        })
    }
}
