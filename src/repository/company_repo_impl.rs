// ==========================================
// 企业地址批量导入系统 - 企业仓储 SQLite 实现
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::db::{init_schema, open_in_memory_connection, open_sqlite_connection};
use crate::domain::company::{
    Address, AddressKey, Company, CompanyWithAddresses, NewAddress, NewCompany,
};
use crate::repository::company_repo::{CompanyRepository, CompanyStore};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{trace, warn};

const COMPANY_COLUMNS: &str = "id, name, registration_number, created_at, updated_at";
const ADDRESS_COLUMNS: &str =
    "id, company_id, street, city, postal_code, country, created_at, updated_at";

fn map_company(row: &Row<'_>) -> SqliteResult<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        registration_number: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_address(row: &Row<'_>) -> SqliteResult<Address> {
    Ok(Address {
        id: row.get(0)?,
        company_id: row.get(1)?,
        street: row.get(2)?,
        city: row.get(3)?,
        postal_code: row.get(4)?,
        country: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

// ==========================================
// SqliteCompanyStore - 事务内操作
// ==========================================
pub struct SqliteCompanyStore<'a> {
    conn: &'a Connection,
}

impl SqliteCompanyStore<'_> {
    fn insert_address_row(&self, company_id: i64, address: &NewAddress) -> RepositoryResult<Address> {
        let now = Utc::now();
        self.conn.execute(
            r#"
            INSERT INTO addresses (
                company_id, street, city, postal_code, country, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                company_id,
                address.street,
                address.city,
                address.postal_code,
                address.country,
                now,
                now,
            ],
        )?;

        Ok(Address {
            id: self.conn.last_insert_rowid(),
            company_id,
            street: address.street.clone(),
            city: address.city.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl CompanyStore for SqliteCompanyStore<'_> {
    fn find_company_by_registration_number(
        &self,
        registration_number: i64,
    ) -> RepositoryResult<Option<Company>> {
        let sql = format!(
            "SELECT {} FROM companies WHERE registration_number = ?1",
            COMPANY_COLUMNS
        );
        let company = self
            .conn
            .query_row(&sql, params![registration_number], map_company)
            .optional()?;
        Ok(company)
    }

    fn find_address_by_key(
        &self,
        company_id: i64,
        key: &AddressKey<'_>,
    ) -> RepositoryResult<Option<Address>> {
        let sql = format!(
            "SELECT {} FROM addresses \
             WHERE company_id = ?1 AND street = ?2 AND city = ?3 AND country = ?4",
            ADDRESS_COLUMNS
        );
        let address = self
            .conn
            .query_row(
                &sql,
                params![company_id, key.street, key.city, key.country],
                map_address,
            )
            .optional()?;
        Ok(address)
    }

    fn insert_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses> {
        let now = Utc::now();
        self.conn.execute(
            r#"
            INSERT INTO companies (name, registration_number, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![company.name, company.registration_number, now, now],
        )?;

        let persisted = Company {
            id: self.conn.last_insert_rowid(),
            name: company.name.clone(),
            registration_number: company.registration_number,
            created_at: now,
            updated_at: now,
        };
        trace!(company_id = persisted.id, "企业已插入");

        let mut addresses = Vec::with_capacity(company.addresses.len());
        for address in &company.addresses {
            addresses.push(self.insert_address_row(persisted.id, address)?);
        }

        Ok(CompanyWithAddresses {
            company: persisted,
            addresses,
        })
    }

    fn insert_address(&self, company_id: i64, address: &NewAddress) -> RepositoryResult<Address> {
        self.insert_address_row(company_id, address)
    }

    fn update_address(
        &self,
        address: &Address,
        postal_code: Option<&str>,
    ) -> RepositoryResult<Address> {
        let now = Utc::now();
        let changed = self.conn.execute(
            "UPDATE addresses SET postal_code = ?1, updated_at = ?2 WHERE id = ?3",
            params![postal_code, now, address.id],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Address".to_string(),
                id: address.id.to_string(),
            });
        }

        Ok(Address {
            postal_code: postal_code.map(str::to_string),
            updated_at: now,
            ..address.clone()
        })
    }
}

// ==========================================
// SqliteCompanyRepository
// ==========================================
pub struct SqliteCompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCompanyRepository {
    /// 打开数据库文件并确保 schema 存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（已建表）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn load_addresses(conn: &Connection, company_id: i64) -> RepositoryResult<Vec<Address>> {
        let sql = format!(
            "SELECT {} FROM addresses WHERE company_id = ?1 ORDER BY id ASC",
            ADDRESS_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let addresses = stmt
            .query_map(params![company_id], map_address)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(addresses)
    }
}

impl CompanyRepository for SqliteCompanyRepository {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CompanyStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let outcome = {
            let store = SqliteCompanyStore { conn: &tx };
            f(&store)
        };

        match outcome {
            Ok(value) => {
                tx.commit().map_err(RepositoryError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "事务回滚失败");
                }
                Err(err)
            }
        }
    }

    fn create_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses> {
        self.with_transaction(|store| store.insert_company(company))
    }

    fn find_company(&self, company_id: i64) -> RepositoryResult<Option<CompanyWithAddresses>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM companies WHERE id = ?1", COMPANY_COLUMNS);
        let company = conn
            .query_row(&sql, params![company_id], map_company)
            .optional()?;

        match company {
            Some(company) => {
                let addresses = Self::load_addresses(&conn, company.id)?;
                Ok(Some(CompanyWithAddresses { company, addresses }))
            }
            None => Ok(None),
        }
    }

    fn list_companies(&self) -> RepositoryResult<Vec<CompanyWithAddresses>> {
        let conn = self.get_conn()?;

        let sql = format!("SELECT {} FROM companies ORDER BY id ASC", COMPANY_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let companies = stmt
            .query_map([], map_company)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let sql = format!(
            "SELECT {} FROM addresses ORDER BY company_id ASC, id ASC",
            ADDRESS_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut by_company: HashMap<i64, Vec<Address>> = HashMap::new();
        for address in stmt.query_map([], map_address)? {
            let address = address?;
            by_company.entry(address.company_id).or_default().push(address);
        }

        Ok(companies
            .into_iter()
            .map(|company| {
                let addresses = by_company.remove(&company.id).unwrap_or_default();
                CompanyWithAddresses { company, addresses }
            })
            .collect())
    }

    fn count_companies(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_addresses(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM addresses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete_company(&self, company_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM companies WHERE id = ?1", params![company_id])?;
        Ok(changed > 0)
    }
}
