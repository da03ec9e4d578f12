// ==========================================
// 企业地址批量导入系统 - 记录校验器
// ==========================================
// 职责: 企业/地址字段级业务校验 → 写入载荷 或 FieldErrors
// 规则:
//   - 企业: name 必填且 ≤256 字符; registration_number 必填且为 64 位整数
//   - 地址: street / city / country 必填, postal_code 可空
//   - 随新企业保存的地址错误以 "addresses." 为前缀
// 说明: 注册号唯一性由存储层约束保证, 不在此校验
// ==========================================

use crate::domain::company::{AddressDraft, CompanyDraft, NewAddress, NewCompany, NAME_MAX_LENGTH};
use crate::domain::validation::FieldErrors;
use crate::i18n;

/// 校验消息键（locales/*.yml 中 validation.* 下）
pub mod message_keys {
    pub const BLANK: &str = "validation.blank";
    pub const NOT_A_NUMBER: &str = "validation.not_a_number";
    pub const NOT_AN_INTEGER: &str = "validation.not_an_integer";
    pub const TOO_LONG: &str = "validation.too_long";
    pub const TAKEN: &str = "validation.taken";
    pub const OUT_OF_RANGE: &str = "validation.out_of_range";
}

/// 嵌套地址的字段前缀
pub const ADDRESSES_PREFIX: &str = "addresses";

// ==========================================
// 注册号解析
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationNumberError {
    Blank,
    NotANumber,
    NotAnInteger,
    OutOfRange,
}

/// 解析注册号原始文本
///
/// # 规则
/// - 可带正负号的纯数字 → i64（超出范围 → OutOfRange）
/// - 可解析为有限小数/科学计数 → NotAnInteger
/// - 其他 → NotANumber
pub fn parse_registration_number(raw: Option<&str>) -> Result<i64, RegistrationNumberError> {
    let value = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(RegistrationNumberError::Blank),
    };

    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<i64>()
            .map_err(|_| RegistrationNumberError::OutOfRange);
    }

    let looks_numeric = value.bytes().any(|b| b.is_ascii_digit());
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && looks_numeric => Err(RegistrationNumberError::NotAnInteger),
        _ => Err(RegistrationNumberError::NotANumber),
    }
}

// ==========================================
// RecordValidator
// ==========================================
// 非空判定总是忽略首尾空白; 写入值是否去空白由 trim_values 决定
#[derive(Debug, Clone)]
pub struct RecordValidator {
    locale: String,
    trim_values: bool,
}

impl RecordValidator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            trim_values: true,
        }
    }

    /// 写入值是否去除首尾空白（对应 import.trim_whitespace）
    pub fn with_trim_values(mut self, trim_values: bool) -> Self {
        self.trim_values = trim_values;
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn stored<'a>(&self, value: &'a str) -> &'a str {
        if self.trim_values {
            value.trim()
        } else {
            value
        }
    }

    /// 本地化校验消息
    pub fn message(&self, key: &str) -> String {
        i18n::t(key, &self.locale)
    }

    /// 校验企业及其随附的新地址
    ///
    /// # 返回
    /// - Ok(NewCompany): 可直接写入
    /// - Err(FieldErrors): 企业字段在前, 地址字段以 "addresses." 为前缀在后
    pub fn validate_company(&self, draft: &CompanyDraft) -> Result<NewCompany, FieldErrors> {
        let mut errors = FieldErrors::new();

        // name
        let name = draft.name.as_deref().map(|v| self.stored(v)).unwrap_or("");
        if name.trim().is_empty() {
            errors.add("name", self.message(message_keys::BLANK));
        } else if name.chars().count() > NAME_MAX_LENGTH {
            errors.add(
                "name",
                i18n::t_with_args(
                    message_keys::TOO_LONG,
                    &self.locale,
                    &[("count", &NAME_MAX_LENGTH.to_string())],
                ),
            );
        }

        // registration_number
        let registration_number =
            match parse_registration_number(draft.registration_number.as_deref()) {
                Ok(n) => Some(n),
                Err(err) => {
                    self.add_registration_number_error(&mut errors, err);
                    None
                }
            };

        // 随附地址
        let mut addresses = Vec::with_capacity(draft.addresses.len());
        for address in &draft.addresses {
            match self.validate_address(address) {
                Ok(valid) => addresses.push(valid),
                Err(nested) => errors.merge_nested(ADDRESSES_PREFIX, nested),
            }
        }

        match registration_number {
            Some(registration_number) if errors.is_empty() => Ok(NewCompany {
                name: name.to_string(),
                registration_number,
                addresses,
            }),
            _ => Err(errors),
        }
    }

    /// 校验单个地址（未加前缀）
    pub fn validate_address(&self, draft: &AddressDraft) -> Result<NewAddress, FieldErrors> {
        let mut errors = FieldErrors::new();

        let street = self.require(&mut errors, "street", draft.street.as_deref());
        let city = self.require(&mut errors, "city", draft.city.as_deref());
        let country = self.require(&mut errors, "country", draft.country.as_deref());

        match (street, city, country) {
            (Some(street), Some(city), Some(country)) if errors.is_empty() => Ok(NewAddress {
                street,
                city,
                postal_code: draft
                    .postal_code
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| self.stored(v).to_string()),
                country,
            }),
            _ => Err(errors),
        }
    }

    fn require(&self, errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(self.stored(v).to_string()),
            _ => {
                errors.add(field, self.message(message_keys::BLANK));
                None
            }
        }
    }

    fn add_registration_number_error(&self, errors: &mut FieldErrors, err: RegistrationNumberError) {
        const FIELD: &str = "registration_number";
        match err {
            RegistrationNumberError::Blank => {
                errors.add(FIELD, self.message(message_keys::BLANK));
                errors.add(FIELD, self.message(message_keys::NOT_A_NUMBER));
            }
            RegistrationNumberError::NotANumber => {
                errors.add(FIELD, self.message(message_keys::NOT_A_NUMBER))
            }
            RegistrationNumberError::NotAnInteger => {
                errors.add(FIELD, self.message(message_keys::NOT_AN_INTEGER))
            }
            RegistrationNumberError::OutOfRange => {
                errors.add(FIELD, self.message(message_keys::OUT_OF_RANGE))
            }
        }
    }
}
