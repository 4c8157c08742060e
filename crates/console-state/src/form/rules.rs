//! 常用校验规则与判定函数
//!
//! 除 `required` 外，规则对空值（null 或空字符串）直接放行，需要必填时与 `required` 组合使用。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use validator::{ValidateEmail, ValidateUrl};

use super::FieldRule;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").unwrap());

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]{3,15}$").unwrap());

static PASSWORD_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d@$!%*#?&]{8,}$").unwrap());

static ID_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[1-9]\d{5}(18|19|20)\d{2}((0[1-9])|(1[0-2]))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$",
    )
    .unwrap()
});

// ==================== 判定函数 ====================

/// 大陆手机号
pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    value.validate_email()
}

pub fn is_url(value: &str) -> bool {
    value.validate_url()
}

/// 字母开头，4-16 位字母数字下划线
pub fn is_username(value: &str) -> bool {
    USERNAME_RE.is_match(value)
}

/// 至少 8 位，同时包含字母和数字
pub fn is_strong_password(value: &str) -> bool {
    PASSWORD_CHARSET_RE.is_match(value)
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// 18 位身份证号
pub fn is_id_card(value: &str) -> bool {
    ID_CARD_RE.is_match(value)
}

/// null、空白字符串、空数组、空对象
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ==================== 规则 ====================

pub fn required() -> FieldRule {
    FieldRule::new().required().message("此项为必填项")
}

pub fn phone() -> FieldRule {
    string_rule("请输入正确的手机号", is_phone)
}

pub fn email() -> FieldRule {
    string_rule("请输入正确的邮箱地址", is_email)
}

pub fn url() -> FieldRule {
    string_rule("请输入正确的网址", is_url)
}

pub fn username() -> FieldRule {
    string_rule("用户名需以字母开头，4-16 位字母、数字或下划线", is_username)
}

pub fn strong_password() -> FieldRule {
    string_rule("密码至少 8 位，且需包含字母和数字", is_strong_password)
}

pub fn id_card() -> FieldRule {
    string_rule("请输入正确的身份证号", is_id_card)
}

pub fn min_len(min: u32) -> FieldRule {
    FieldRule::new().min(min).message(format!("最少{}个字符", min))
}

pub fn max_len(max: u32) -> FieldRule {
    FieldRule::new().max(max).message(format!("最多{}个字符", max))
}

/// 空值放行，非字符串值视为不合法
fn string_rule(message: &str, predicate: fn(&str) -> bool) -> FieldRule {
    FieldRule::new()
        .message(message)
        .validator(move |value: Value| async move {
            match value {
                Value::Null => true,
                Value::String(s) => s.is_empty() || predicate(&s),
                _ => false,
            }
        })
}
