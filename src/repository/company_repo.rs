// ==========================================
// 企业地址批量导入系统 - 企业仓储 Trait
// ==========================================
// 职责: 定义企业/地址数据访问接口（不包含业务逻辑）
// 红线: Repository 不含对账规则，只做数据 CRUD 与事务边界
// ==========================================

use crate::domain::company::{Address, AddressKey, Company, CompanyWithAddresses, NewAddress, NewCompany};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// CompanyStore Trait
// ==========================================
// 用途: 单个事务内可用的操作
// 实现者: SqliteCompanyStore（事务句柄）
pub trait CompanyStore {
    /// 按注册号查询企业（至多一条）
    fn find_company_by_registration_number(
        &self,
        registration_number: i64,
    ) -> RepositoryResult<Option<Company>>;

    /// 在企业内按自然键查询地址（至多一条）
    fn find_address_by_key(
        &self,
        company_id: i64,
        key: &AddressKey<'_>,
    ) -> RepositoryResult<Option<Address>>;

    /// 插入企业及其随附的新地址
    ///
    /// # 返回
    /// - Ok(CompanyWithAddresses): 含存储生成的 id
    /// - Err(UniqueConstraintViolation): 注册号（或地址自然键）已存在
    fn insert_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses>;

    /// 在企业下插入地址
    fn insert_address(&self, company_id: i64, address: &NewAddress) -> RepositoryResult<Address>;

    /// 更新地址的 postal_code（即使值未变化也会写入）
    fn update_address(
        &self,
        address: &Address,
        postal_code: Option<&str>,
    ) -> RepositoryResult<Address>;
}

// ==========================================
// CompanyRepository Trait
// ==========================================
// 用途: 事务边界 + 事务外的查询/维护操作
// 实现者: SqliteCompanyRepository（使用 rusqlite）
pub trait CompanyRepository {
    /// 在单个事务中执行 f
    ///
    /// # 规则
    /// - f 返回 Ok → 提交；提交失败按 E::from(RepositoryError) 返回
    /// - f 返回 Err → 回滚，原样返回 Err
    /// - f panic 或提前退出 → 事务句柄 drop 时回滚
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CompanyStore) -> Result<T, E>,
        E: From<RepositoryError>;

    /// 创建企业及其地址（单事务）
    fn create_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses>;

    /// 按 id 查询企业及其地址
    fn find_company(&self, company_id: i64) -> RepositoryResult<Option<CompanyWithAddresses>>;

    /// 查询全部企业及其地址（按 id 升序）
    fn list_companies(&self) -> RepositoryResult<Vec<CompanyWithAddresses>>;

    /// 统计企业数
    fn count_companies(&self) -> RepositoryResult<usize>;

    /// 统计地址数
    fn count_addresses(&self) -> RepositoryResult<usize>;

    /// 删除企业（地址级联删除）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 企业不存在
    fn delete_company(&self, company_id: i64) -> RepositoryResult<bool>;
}
