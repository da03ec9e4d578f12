// ==========================================
// 企业地址批量导入系统 - 对账引擎
// ==========================================
// 职责: 单行对账（每行一个独立事务）
// 状态机: Parsed → CompanyResolved → {AddressAttachedPending | AddressUpdated | AddressInvalid}
//         → {Persisted | PersistInvalid}
// 红线: 行级错误（校验失败/约束冲突）不得中止整批
// 红线: 企业与其新地址原子提交; 失败行不留下任何写入
// ==========================================

use crate::domain::company::{Company, NewAddress};
use crate::domain::import::{ImportRow, InvalidRowRecord};
use crate::domain::validation::{FieldErrors, BASE_FIELD};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::validator::{
    message_keys, parse_registration_number, RecordValidator, ADDRESSES_PREFIX,
};
use crate::repository::company_repo::{CompanyRepository, CompanyStore};
use crate::repository::error::RepositoryError;
use serde::Serialize;
use tracing::{debug, warn};

// ==========================================
// 行处理结果
// ==========================================

/// 成功行的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistedState {
    CompanyCreated,  // 新企业 + 随附地址
    AddressAppended, // 已有企业 + 新地址
    AddressUpdated,  // 已有企业 + 已有地址（postal_code 覆盖）
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Persisted {
        index: usize,
        company_id: i64,
        state: PersistedState,
    },
    Invalid(InvalidRowRecord),
}

/// 地址错误键的作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressScope {
    Nested,     // 随新企业保存: addresses.<field>
    Standalone, // 已有企业下追加/更新: <field>
}

/// 事务内的行错误（决定提交/回滚后再分类）
#[derive(Debug)]
enum RowError {
    Rejected(FieldErrors),
    Constraint {
        source: RepositoryError,
        scope: AddressScope,
    },
    Store(RepositoryError),
}

impl RowError {
    fn from_store(err: RepositoryError, scope: AddressScope) -> Self {
        if err.is_constraint_violation() {
            RowError::Constraint { source: err, scope }
        } else {
            RowError::Store(err)
        }
    }
}

impl From<RepositoryError> for RowError {
    fn from(err: RepositoryError) -> Self {
        RowError::from_store(err, AddressScope::Nested)
    }
}

// ==========================================
// Reconciler
// ==========================================
pub struct Reconciler {
    validator: RecordValidator,
}

impl Reconciler {
    pub fn new(validator: RecordValidator) -> Self {
        Self { validator }
    }

    /// 在独立事务中对账单行
    ///
    /// # 返回
    /// - Ok(Persisted): 已提交, 企业 id 可计入结果
    /// - Ok(Invalid): 已回滚, 行记为无效
    /// - Err(Repository): 基础设施故障, 整批中止
    pub fn reconcile_row<R: CompanyRepository>(
        &self,
        repo: &R,
        row: &ImportRow,
    ) -> ImporterResult<RowOutcome> {
        let result = repo.with_transaction(|store| self.apply_row(store, row));

        let errors = match result {
            Ok((company_id, state)) => {
                debug!(index = row.index, company_id, state = ?state, "行已提交");
                return Ok(RowOutcome::Persisted {
                    index: row.index,
                    company_id,
                    state,
                });
            }
            Err(RowError::Rejected(errors)) => errors,
            Err(RowError::Constraint { source, scope }) => {
                debug!(index = row.index, error = %source, "提交时约束冲突");
                self.constraint_errors(&source, scope)
            }
            Err(RowError::Store(err)) => return Err(ImportError::Repository(err)),
        };

        let record = InvalidRowRecord {
            index: row.index,
            detail: errors.to_detail(self.validator.locale()),
            errors,
        };
        warn!(index = record.index, detail = %record.detail, "行无效, 已跳过");
        Ok(RowOutcome::Invalid(record))
    }

    fn apply_row(
        &self,
        store: &dyn CompanyStore,
        row: &ImportRow,
    ) -> Result<(i64, PersistedState), RowError> {
        // 1. 解析企业（注册号无法解析时视为新企业, 由校验报告错误）
        let existing = match parse_registration_number(row.registration_number.as_deref()) {
            Ok(registration_number) => store.find_company_by_registration_number(registration_number)?,
            Err(_) => None,
        };

        match existing {
            None => self.create_company(store, row),
            Some(company) => self.attach_address(store, &company, row),
        }
    }

    /// 新企业: 地址随企业一并校验、一并写入
    fn create_company(
        &self,
        store: &dyn CompanyStore,
        row: &ImportRow,
    ) -> Result<(i64, PersistedState), RowError> {
        let mut draft = row.company_draft();
        draft.addresses.push(row.address_draft());

        let company = self
            .validator
            .validate_company(&draft)
            .map_err(RowError::Rejected)?;

        let persisted = store
            .insert_company(&company)
            .map_err(|e| RowError::from_store(e, AddressScope::Nested))?;

        Ok((persisted.company.id, PersistedState::CompanyCreated))
    }

    /// 已有企业: 按 (street, city, country) 匹配地址, 命中则更新 postal_code, 否则追加
    ///
    /// 行中的 name 不会覆盖已有企业名称
    fn attach_address(
        &self,
        store: &dyn CompanyStore,
        company: &Company,
        row: &ImportRow,
    ) -> Result<(i64, PersistedState), RowError> {
        let address: NewAddress = self
            .validator
            .validate_address(&row.address_draft())
            .map_err(RowError::Rejected)?;

        let standalone = |e| RowError::from_store(e, AddressScope::Standalone);

        match store.find_address_by_key(company.id, &address.natural_key())? {
            Some(existing) => {
                store
                    .update_address(&existing, address.postal_code.as_deref())
                    .map_err(standalone)?;
                Ok((company.id, PersistedState::AddressUpdated))
            }
            None => {
                store
                    .insert_address(company.id, &address)
                    .map_err(standalone)?;
                Ok((company.id, PersistedState::AddressAppended))
            }
        }
    }

    /// 约束冲突 → 字段错误
    ///
    /// - companies.registration_number → registration_number
    /// - addresses.<col>（跳过 company_id）→ addresses.<col> 或 <col>
    /// - 其他 → base
    fn constraint_errors(&self, source: &RepositoryError, scope: AddressScope) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let columns = source.violated_columns();
        let taken = self.validator.message(message_keys::TAKEN);

        if columns.iter().any(|c| c == "companies.registration_number") {
            errors.add("registration_number", taken);
            return errors;
        }

        let address_column = columns
            .iter()
            .filter_map(|c| c.strip_prefix("addresses."))
            .find(|c| *c != "company_id");

        match address_column {
            Some(column) => {
                let field = match scope {
                    AddressScope::Nested => format!("{}.{}", ADDRESSES_PREFIX, column),
                    AddressScope::Standalone => column.to_string(),
                };
                errors.add(field, taken);
            }
            None => errors.add(BASE_FIELD, constraint_message(source)),
        }
        errors
    }
}

fn constraint_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::UniqueConstraintViolation(msg)
        | RepositoryError::ForeignKeyViolation(msg)
        | RepositoryError::ConstraintViolation(msg)
        | RepositoryError::ValidationError(msg) => msg.clone(),
        other => other.to_string(),
    }
}
