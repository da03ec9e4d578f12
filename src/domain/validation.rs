// ==========================================
// 企业地址批量导入系统 - 结构化校验错误
// ==========================================
// 职责: 字段路径 → 消息列表 的有序映射
// 用途: 对账引擎产出, 结果汇总器/报告直接透传
// 约定: 嵌套字段使用限定路径（如 addresses.city）
// ==========================================

use crate::i18n;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// 不归属具体字段的错误
pub const BASE_FIELD: &str = "base";

// ==========================================
// FieldErrors - 字段级错误集合
// ==========================================
// 保持插入顺序: 完整消息按校验顺序拼接
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条错误消息
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    /// 合并子实体错误，字段加前缀（如 "addresses" + "city" → "addresses.city"）
    pub fn merge_nested(&mut self, prefix: &str, nested: FieldErrors) {
        for (field, messages) in nested.entries {
            let qualified = format!("{}.{}", prefix, field);
            for message in messages {
                self.add(qualified.clone(), message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 出错字段数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 指定字段的错误消息
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(f, messages)| (f.as_str(), messages.as_slice()))
    }

    /// 完整消息列表（属性名 + 消息）
    ///
    /// # 示例
    /// - ("registration_number", "is not a number") → "Registration number is not a number"
    /// - ("addresses.city", "can't be blank") → "Addresses city can't be blank"
    pub fn full_messages(&self, locale: &str) -> Vec<String> {
        let mut result = Vec::new();
        for (field, messages) in self.iter() {
            for message in messages {
                if field == BASE_FIELD {
                    result.push(message.clone());
                    continue;
                }
                let attribute = human_attribute_name(field, locale);
                result.push(i18n::t_with_args(
                    "errors.format",
                    locale,
                    &[("attribute", &attribute), ("message", message)],
                ));
            }
        }
        result
    }

    /// 完整消息以 ", " 拼接，作为 invalid row 的 detail
    pub fn to_detail(&self, locale: &str) -> String {
        self.full_messages(locale).join(", ")
    }
}

// JSON 输出为对象，键顺序与插入顺序一致
impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in self.iter() {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// 字段路径 → 展示名
///
/// 先查 attributes.<路径, '.' 替换为 '_'>，缺失时退化为首字母大写的人性化名称
pub fn human_attribute_name(field: &str, locale: &str) -> String {
    let key = format!("attributes.{}", field.replace('.', "_"));
    if i18n::has_translation(&key, locale) {
        return i18n::t(&key, locale);
    }
    humanize(field)
}

fn humanize(field: &str) -> String {
    let spaced = field.replace(['.', '_'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
