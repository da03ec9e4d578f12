// ==========================================
// 企业地址批量导入系统 - 企业/地址领域模型
// ==========================================
// 对齐: companies / addresses 表
// 红线: registration_number 是跨行/跨批次识别企业的唯一依据
// 红线: 地址在所属企业内仅按 (street, city, country) 匹配, postal_code 为可变载荷
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 企业名称最大长度（字符）
pub const NAME_MAX_LENGTH: usize = 256;

// ==========================================
// Company - 企业（已持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,                   // 存储生成的主键
    pub name: String,              // 企业名称（≤256 字符）
    pub registration_number: i64,  // 注册号（自然键, 全局唯一）
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// Address - 地址（已持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub company_id: i64,             // 所属企业（FK, 级联删除）
    pub street: String,
    pub city: String,
    pub postal_code: Option<String>, // 可选, 不参与匹配
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 企业及其全部地址（查询/报告用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyWithAddresses {
    #[serde(flatten)]
    pub company: Company,
    pub addresses: Vec<Address>,
}

// ==========================================
// AddressKey - 地址自然键
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressKey<'a> {
    pub street: &'a str,
    pub city: &'a str,
    pub country: &'a str,
}

// ==========================================
// 草稿（未校验, 来自导入行）
// ==========================================

/// 企业草稿: 字段原样保留, 注册号为原始文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub addresses: Vec<AddressDraft>, // 随企业一并保存的新地址
}

/// 地址草稿
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

// ==========================================
// 写入载荷（已通过校验）
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub registration_number: i64,
    pub addresses: Vec<NewAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub country: String,
}

impl NewAddress {
    pub fn natural_key(&self) -> AddressKey<'_> {
        AddressKey {
            street: &self.street,
            city: &self.city,
            country: &self.country,
        }
    }
}
