// ==========================================
// CompanyImporter 集成测试
// ==========================================
// 测试目标: 验证完整的企业/地址导入流程
// 覆盖: 同注册号去重 / 行级失败隔离 / 地址按自然键更新 / 重复导入幂等 / 提交时约束冲突
// ==========================================


use company_import::config::{config_keys, ImportConfig};
use company_import::domain::{Address, AddressKey, Company, CompanyWithAddresses, NewAddress, NewCompany};
use company_import::importer::{CompanyImporterImpl, FieldMapperImpl, ImportError, ImportReport};
use company_import::logging;
use company_import::repository::{
    CompanyRepository, CompanyStore, RepositoryError, RepositoryResult, SqliteCompanyRepository,
};
use company_import::CompanyImporter;
use test_helpers::{
    create_test_db, create_test_importer, fixture_path, insert_test_config, write_csv,
    write_raw_csv,
};

// ==========================================
// 提交时约束冲突模拟: 查询总是"看不到"已有数据
// ==========================================

struct StaleLookupRepository {
    inner: SqliteCompanyRepository,
    stale_companies: bool,
    stale_addresses: bool,
}

struct StaleLookupStore<'a> {
    inner: &'a dyn CompanyStore,
    stale_companies: bool,
    stale_addresses: bool,
}

impl CompanyStore for StaleLookupStore<'_> {
    fn find_company_by_registration_number(
        &self,
        registration_number: i64,
    ) -> RepositoryResult<Option<Company>> {
        if self.stale_companies {
            return Ok(None);
        }
        self.inner.find_company_by_registration_number(registration_number)
    }

    fn find_address_by_key(
        &self,
        company_id: i64,
        key: &AddressKey<'_>,
    ) -> RepositoryResult<Option<Address>> {
        if self.stale_addresses {
            return Ok(None);
        }
        self.inner.find_address_by_key(company_id, key)
    }

    fn insert_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses> {
        self.inner.insert_company(company)
    }

    fn insert_address(&self, company_id: i64, address: &NewAddress) -> RepositoryResult<Address> {
        self.inner.insert_address(company_id, address)
    }

    fn update_address(
        &self,
        address: &Address,
        postal_code: Option<&str>,
    ) -> RepositoryResult<Address> {
        self.inner.update_address(address, postal_code)
    }
}

impl CompanyRepository for StaleLookupRepository {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CompanyStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner.with_transaction(|store| {
            let stale = StaleLookupStore {
                inner: store,
                stale_companies: self.stale_companies,
                stale_addresses: self.stale_addresses,
            };
            f(&stale)
        })
    }

    fn create_company(&self, company: &NewCompany) -> RepositoryResult<CompanyWithAddresses> {
        self.inner.create_company(company)
    }

    fn find_company(&self, company_id: i64) -> RepositoryResult<Option<CompanyWithAddresses>> {
        self.inner.find_company(company_id)
    }

    fn list_companies(&self) -> RepositoryResult<Vec<CompanyWithAddresses>> {
        self.inner.list_companies()
    }

    fn count_companies(&self) -> RepositoryResult<usize> {
        self.inner.count_companies()
    }

    fn count_addresses(&self) -> RepositoryResult<usize> {
        self.inner.count_addresses()
    }

    fn delete_company(&self, company_id: i64) -> RepositoryResult<bool> {
        self.inner.delete_company(company_id)
    }
}

fn stale_importer(
    stale_companies: bool,
    stale_addresses: bool,
) -> CompanyImporterImpl<StaleLookupRepository, ImportConfig> {
    let repo = StaleLookupRepository {
        inner: SqliteCompanyRepository::in_memory().unwrap(),
        stale_companies,
        stale_addresses,
    };
    CompanyImporterImpl::new(repo, ImportConfig::default(), Box::new(FieldMapperImpl))
}

fn find_by_registration_number<R: CompanyRepository>(
    repo: &R,
    registration_number: i64,
) -> CompanyWithAddresses {
    repo.list_companies()
        .unwrap()
        .into_iter()
        .find(|c| c.company.registration_number == registration_number)
        .unwrap()
}

fn sorted_streets(company: &CompanyWithAddresses) -> Vec<String> {
    let mut streets: Vec<String> = company.addresses.iter().map(|a| a.street.clone()).collect();
    streets.sort();
    streets
}

// ==========================================
// 基本导入
// ==========================================

#[test]
fn test_import_companies_with_addresses() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .import_from_path(fixture_path("companies.csv"))
        .unwrap();

    assert_eq!(result.imported_company_ids().len(), 2);
    assert!(result.invalid_rows().is_empty());

    let repo = importer.repository();
    assert_eq!(repo.count_companies().unwrap(), 2);
    assert_eq!(repo.count_addresses().unwrap(), 3);

    let example_co = find_by_registration_number(repo, 123456789);
    let another_co = find_by_registration_number(repo, 987654321);

    assert_eq!(example_co.company.name, "Example Co");
    assert_eq!(another_co.company.name, "Another Co");
    assert_eq!(sorted_streets(&example_co), vec!["123 Main St", "456 Elm St"]);
    assert_eq!(sorted_streets(&another_co), vec!["789 Oak St"]);

    let mut postal_codes: Vec<Option<String>> =
        example_co.addresses.iter().map(|a| a.postal_code.clone()).collect();
    postal_codes.sort();
    assert_eq!(
        postal_codes,
        vec![Some("10001".to_string()), Some("90001".to_string())]
    );
    assert!(example_co.addresses.iter().all(|a| a.country == "USA"));
}

#[test]
fn test_two_rows_same_registration_number_one_company() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,123456789,123 Main St,New York,10001,USA",
        "Example Co,123456789,456 Elm St,Los Angeles,90001,USA",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    let company = find_by_registration_number(importer.repository(), 123456789);
    assert_eq!(
        result.imported_company_ids().iter().copied().collect::<Vec<_>>(),
        vec![company.company.id]
    );
    assert!(result.invalid_rows().is_empty());
    assert_eq!(importer.repository().count_companies().unwrap(), 1);
    assert_eq!(company.addresses.len(), 2);
}

#[test]
fn test_existing_company_gets_new_addresses() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let existing = importer
        .repository()
        .create_company(&NewCompany {
            name: "Example Co".to_string(),
            registration_number: 123456789,
            addresses: vec![NewAddress {
                street: "Old St".to_string(),
                city: "Old City".to_string(),
                postal_code: Some("12345".to_string()),
                country: "USA".to_string(),
            }],
        })
        .unwrap();

    let result = importer
        .import_from_path(fixture_path("companies.csv"))
        .unwrap();

    assert!(result.imported_company_ids().contains(&existing.company.id));
    assert_eq!(importer.repository().count_companies().unwrap(), 2);

    let company = importer
        .repository()
        .find_company(existing.company.id)
        .unwrap()
        .unwrap();
    assert_eq!(company.addresses.len(), 3);
}

#[test]
fn test_empty_input_is_not_an_error() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let empty = write_raw_csv("");
    let result = importer.import_from_path(empty.path()).unwrap();
    assert!(result.imported_company_ids().is_empty());
    assert!(result.invalid_rows().is_empty());

    let header_only = write_csv(&[]);
    let result = importer.import_from_path(header_only.path()).unwrap();
    assert!(result.imported_company_ids().is_empty());
    assert!(result.invalid_rows().is_empty());
}

// ==========================================
// 行级失败
// ==========================================

#[test]
fn test_invalid_rows_do_not_break_import() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .import_from_path(fixture_path("companies_with_invalid.csv"))
        .unwrap();

    assert_eq!(result.imported_company_ids().len(), 1);
    let company_id = *result.imported_company_ids().iter().next().unwrap();
    let company = importer.repository().find_company(company_id).unwrap().unwrap();

    assert_eq!(company.company.name, "Example Co");
    assert_eq!(company.company.registration_number, 123456789);
    assert_eq!(company.addresses.len(), 1);
    assert_eq!(company.addresses[0].street, "123 Main St");
    assert_eq!(company.addresses[0].city, "New York");
    assert_eq!(company.addresses[0].postal_code.as_deref(), Some("10001"));
    assert_eq!(company.addresses[0].country, "USA");

    let invalid = result.invalid_rows();
    assert_eq!(invalid.len(), 2);
    assert_eq!(invalid[0].index, 1);
    assert_eq!(invalid[0].detail, "Registration number is not a number");
    assert_eq!(invalid[1].index, 2);
    assert_eq!(invalid[1].detail, "Addresses city can't be blank");

    let json = serde_json::to_value(invalid).unwrap();
    assert_eq!(
        json[0]["errors"],
        serde_json::json!({"registration_number": ["is not a number"]})
    );
    assert_eq!(
        json[1]["errors"],
        serde_json::json!({"addresses.city": ["can't be blank"]})
    );

    // 失败行没有任何写入
    assert_eq!(importer.repository().count_companies().unwrap(), 1);
    assert_eq!(importer.repository().count_addresses().unwrap(), 1);
}

#[test]
fn test_blank_city_for_existing_company_uses_address_keys() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,123456789,123 Main St,New York,10001,USA",
        "Example Co,123456789,456 Elm St,,90001,USA",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 1);
    let invalid = &result.invalid_rows()[0];
    assert_eq!(invalid.index, 1);
    assert_eq!(invalid.detail, "City can't be blank");
    assert_eq!(invalid.errors.get("city").unwrap(), &["can't be blank".to_string()]);
    assert_eq!(importer.repository().count_addresses().unwrap(), 1);
}

#[test]
fn test_row_isolation_regardless_of_order() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        ",,,,,",
        "Broken Co,not-a-number,1 Side St,Boston,,USA",
        "Good Co,1,1 Side St,Boston,,USA",
        ",2,2 Side St,Boston,,USA",
        "Other Co,3,3 Side St,Paris,75001,France",
        "Other Co,3,,Paris,75001,",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    let indices: Vec<usize> = result.invalid_rows().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 3, 5]);
    assert_eq!(result.invalid_rows()[2].detail, "Name can't be blank");
    assert_eq!(
        result.invalid_rows()[3].detail,
        "Street can't be blank, Country can't be blank"
    );

    assert_eq!(result.imported_company_ids().len(), 2);
    assert_eq!(importer.repository().count_companies().unwrap(), 2);
    assert_eq!(importer.repository().count_addresses().unwrap(), 2);
}

#[test]
fn test_all_empty_row_is_reported_invalid() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,1,123 Main St,New York,10001,USA",
        ",,,,,",
        "Other Co,2,9 Side St,Boston,,USA",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 2);
    assert_eq!(result.invalid_rows().len(), 1);

    let invalid = &result.invalid_rows()[0];
    assert_eq!(invalid.index, 1);
    assert_eq!(
        invalid.detail,
        "Name can't be blank, \
         Registration number can't be blank, \
         Registration number is not a number, \
         Addresses street can't be blank, \
         Addresses city can't be blank, \
         Addresses country can't be blank"
    );
    let blank = vec!["can't be blank".to_string()];
    assert_eq!(invalid.errors.get("name").unwrap(), blank.as_slice());
    assert_eq!(invalid.errors.get("addresses.street").unwrap(), blank.as_slice());
    assert_eq!(invalid.errors.get("addresses.city").unwrap(), blank.as_slice());
    assert_eq!(invalid.errors.get("addresses.country").unwrap(), blank.as_slice());
}

#[test]
fn test_skip_blank_rows_is_opt_in() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::SKIP_BLANK_ROWS, "true");
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,1,123 Main St,New York,10001,USA",
        ",,,,,",
        "Broken Co,x,9 Side St,Boston,,USA",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    // 跳过的行仍占用序号
    assert_eq!(result.imported_company_ids().len(), 1);
    let indices: Vec<usize> = result.invalid_rows().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![2]);
}

#[test]
fn test_combined_company_errors_detail() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let long_name = "x".repeat(257);
    let row = format!("{},12.5,,Boston,,USA", long_name);
    let csv = write_csv(&[row.as_str()]);
    let result = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(
        result.invalid_rows()[0].detail,
        "Name is too long (maximum is 256 characters), \
         Registration number must be an integer, \
         Addresses street can't be blank"
    );
    assert_eq!(importer.repository().count_companies().unwrap(), 0);
}

// ==========================================
// 地址自然键匹配与幂等
// ==========================================

#[test]
fn test_matching_address_updates_postal_code() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,123456789,123 Main St,New York,10001,USA",
        "Example Co,123456789,123 Main St,New York,10002,USA",
    ]);
    let result = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 1);
    assert!(result.invalid_rows().is_empty());

    let company = find_by_registration_number(importer.repository(), 123456789);
    assert_eq!(company.addresses.len(), 1);
    assert_eq!(company.addresses[0].postal_code.as_deref(), Some("10002"));

    // 邮编为空的行会把已有邮编清空
    let csv = write_csv(&["Example Co,123456789,123 Main St,New York,,USA"]);
    importer.import_from_path(csv.path()).unwrap();
    let company = find_by_registration_number(importer.repository(), 123456789);
    assert_eq!(company.addresses[0].postal_code, None);
}

#[test]
fn test_reimport_is_idempotent() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let csv = write_csv(&[
        "Example Co,123456789,123 Main St,New York,10001,USA",
        "Example Co,123456789,456 Elm St,Los Angeles,90001,USA",
    ]);

    let first = importer.import_from_path(csv.path()).unwrap();
    let second = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(first.imported_company_ids(), second.imported_company_ids());
    assert_eq!(second.imported_company_ids().len(), 1);
    assert!(second.invalid_rows().is_empty());
    assert_eq!(importer.repository().count_companies().unwrap(), 1);
    assert_eq!(importer.repository().count_addresses().unwrap(), 2);
}

// ==========================================
// 提交时约束冲突
// ==========================================

#[test]
fn test_unique_registration_number_violation_is_row_level() {
    logging::init_test();
    let importer = stale_importer(true, false);

    let csv = format!(
        "{}\nExample Co,123456789,123 Main St,New York,10001,USA\n\
         Example Co,123456789,456 Elm St,Los Angeles,90001,USA\n\
         Another Co,987654321,789 Oak St,Chicago,60601,USA\n",
        test_helpers::HEADER
    );
    let result = importer.import_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 2);
    let invalid = result.invalid_rows();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].index, 1);
    assert_eq!(invalid[0].detail, "Registration number has already been taken");
    assert_eq!(
        invalid[0].errors.get("registration_number").unwrap(),
        &["has already been taken".to_string()]
    );

    // 冲突行整体回滚: 地址未写入
    assert_eq!(importer.repository().count_companies().unwrap(), 2);
    assert_eq!(importer.repository().count_addresses().unwrap(), 2);
}

#[test]
fn test_unique_address_violation_is_row_level() {
    logging::init_test();
    let importer = stale_importer(false, true);

    let csv = format!(
        "{}\nExample Co,1,123 Main St,New York,10001,USA\n\
         Example Co,1,123 Main St,New York,10002,USA\n",
        test_helpers::HEADER
    );
    let result = importer.import_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 1);
    assert_eq!(result.invalid_rows()[0].index, 1);
    assert_eq!(result.invalid_rows()[0].detail, "Street has already been taken");
    assert_eq!(importer.repository().count_addresses().unwrap(), 1);
}

// ==========================================
// 配置 / 致命错误 / 报告
// ==========================================

#[test]
fn test_config_from_database() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::CSV_DELIMITER, ";");

    let importer = create_test_importer(&db_path);
    let csv = write_raw_csv(
        "Company Name;Registration No;Street;City;Zip;Country\n\
         Example Co;123456789;123 Main St;New York;10001;USA",
    );
    let result = importer.import_from_path(csv.path()).unwrap();

    assert_eq!(result.imported_company_ids().len(), 1);
    let company = find_by_registration_number(importer.repository(), 123456789);
    assert_eq!(company.addresses[0].postal_code.as_deref(), Some("10001"));
}

#[test]
fn test_untrimmed_values_are_stored_as_given() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::TRIM_WHITESPACE, "false");

    let importer = create_test_importer(&db_path);
    let csv = write_csv(&["Example Co ,123456789, 123 Main St,New York,10001,USA"]);
    let result = importer.import_from_path(csv.path()).unwrap();

    assert!(result.is_clean());
    let company = find_by_registration_number(importer.repository(), 123456789);
    assert_eq!(company.company.name, "Example Co ");
    assert_eq!(company.addresses[0].street, " 123 Main St");
}

#[test]
fn test_invalid_config_is_fatal() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::TRIM_WHITESPACE, "sometimes");

    let importer = create_test_importer(&db_path);
    let err = importer
        .import_from_path(fixture_path("companies.csv"))
        .unwrap_err();

    assert!(matches!(err, ImportError::ConfigValueError { .. }));
    assert_eq!(importer.repository().count_companies().unwrap(), 0);
}

#[test]
fn test_unreadable_source_is_fatal() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let err = importer.import_from_path("missing/companies.csv").unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_report_lists_imported_companies() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .import_from_path(fixture_path("companies_with_invalid.csv"))
        .unwrap();
    let report = ImportReport::build(importer.repository(), &result).unwrap();

    assert_eq!(report.imported_companies.len(), 1);
    assert_eq!(report.imported_companies[0].company.name, "Example Co");
    assert_eq!(report.invalid_rows.len(), 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["imported_companies"][0]["addresses"][0]["street"], "123 Main St");
    assert_eq!(json["invalid_rows"][1]["index"], 2);
}

#[test]
fn test_delete_company_cascades() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    importer
        .import_from_path(fixture_path("companies.csv"))
        .unwrap();
    let company = find_by_registration_number(importer.repository(), 123456789);

    assert!(importer.repository().delete_company(company.company.id).unwrap());
    assert_eq!(importer.repository().count_companies().unwrap(), 1);
    assert_eq!(importer.repository().count_addresses().unwrap(), 1);
}
