// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 注意: 导入引擎显式传入 locale，不依赖全局语言设置
// ==========================================

/// 默认语言（校验消息的对外契约为英文）
pub const DEFAULT_LOCALE: &str = "en";

/// 已打包的语言列表
pub fn available_locales() -> Vec<&'static str> {
    rust_i18n::available_locales!()
}

/// 是否为已打包的语言
pub fn is_supported_locale(locale: &str) -> bool {
    available_locales().iter().any(|l| *l == locale)
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use company_import::i18n::t;
/// let msg = t("validation.blank", "en");
/// ```
pub fn t(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use company_import::i18n::t_with_args;
/// let msg = t_with_args("validation.too_long", "en", &[("count", "256")]);
/// ```
pub fn t_with_args(key: &str, locale: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(key, locale);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 是否存在翻译（rust-i18n 在缺失时回显 key）
pub fn has_translation(key: &str, locale: &str) -> bool {
    let translated = t(key, locale);
    !translated.is_empty() && !translated.ends_with(key)
}
