//! 表单状态
//!
//! 由初始值、按字段的校验规则和可选的提交处理函数构造。字段值以 JSON 表示，
//! 不在 `errors` 中的字段即视为有效；校验失败是数据而不是错误。
//!
//! 每条规则内部按 `required` → `pattern` → `min`/`max` → 自定义校验器的顺序执行，
//! 遇到第一个失败即停止，其消息（或默认消息）成为该字段的错误。

pub mod rules;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error};

/// 表单字段值
pub type Values = serde_json::Map<String, Value>;

/// 自定义校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// 失败，使用规则消息或默认消息
    Invalid,
    /// 失败并给出具体消息
    Message(String),
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Verdict::Valid } else { Verdict::Invalid }
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Verdict::Message(message)
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Verdict::Message(message.to_string())
    }
}

/// 异步自定义校验器
pub type ValidatorFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Verdict> + Send + Sync>;

/// 提交处理函数，收到当前全部字段值的副本
pub type SubmitFn = Arc<dyn Fn(Values) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

// 默认消息
const REQUIRED_MESSAGE: &str = "此字段为必填项";
const PATTERN_MESSAGE: &str = "格式不正确";
const VALIDATOR_MESSAGE: &str = "验证失败";

/// 单条校验规则
#[derive(Clone, Default)]
pub struct FieldRule {
    required: bool,
    message: Option<String>,
    pattern: Option<Regex>,
    min: Option<f64>,
    max: Option<f64>,
    validator: Option<ValidatorFn>,
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("required", &self.required)
            .field("message", &self.message)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("min", &self.min)
            .field("max", &self.max)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 覆盖本条规则所有检查的默认消息
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// 只对字符串值生效
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// 字符串按字符数，数值按大小
    pub fn min(mut self, min: impl Into<f64>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<f64>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn validator<F, Fut, V>(mut self, validator: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = V> + Send + 'static,
        V: Into<Verdict>,
    {
        self.validator = Some(Arc::new(move |value| {
            let verdict = validator(value);
            async move { Into::<Verdict>::into(verdict.await) }.boxed()
        }));
        self
    }

    /// 校验一个值，通过返回 None，失败返回错误消息
    pub async fn check(&self, value: &Value) -> Option<String> {
        let fail = |default: String| Some(self.message.clone().unwrap_or(default));

        if self.required && is_blank(value) {
            return fail(REQUIRED_MESSAGE.to_string());
        }

        if let (Some(pattern), Value::String(s)) = (&self.pattern, value) {
            if !pattern.is_match(s) {
                return fail(PATTERN_MESSAGE.to_string());
            }
        }

        if let Some(min) = self.min {
            match value {
                Value::String(s) if (s.chars().count() as f64) < min => {
                    return fail(format!("最少 {} 个字符", fmt_bound(min)));
                }
                Value::Number(n) if n.as_f64().is_some_and(|v| v < min) => {
                    return fail(format!("最小值为 {}", fmt_bound(min)));
                }
                _ => {}
            }
        }

        if let Some(max) = self.max {
            match value {
                Value::String(s) if (s.chars().count() as f64) > max => {
                    return fail(format!("最多 {} 个字符", fmt_bound(max)));
                }
                Value::Number(n) if n.as_f64().is_some_and(|v| v > max) => {
                    return fail(format!("最大值为 {}", fmt_bound(max)));
                }
                _ => {}
            }
        }

        if let Some(validator) = &self.validator {
            match validator(value.clone()).await {
                Verdict::Valid => {}
                Verdict::Invalid => return fail(VALIDATOR_MESSAGE.to_string()),
                Verdict::Message(message) => return Some(message),
            }
        }

        None
    }
}

/// null 或空字符串
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// 整数边界不带小数点
fn fmt_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

#[derive(Debug, Default)]
struct FormInner {
    values: Values,
    errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
    submitting: bool,
}

/// 处理函数结束（包括 panic 展开和 future 被丢弃）时复位提交状态
struct SubmittingGuard(Arc<Mutex<FormInner>>);

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.0.lock().submitting = false;
    }
}

#[derive(Clone)]
pub struct FormState {
    initial: Values,
    rules: BTreeMap<String, Vec<FieldRule>>,
    on_submit: Option<SubmitFn>,
    inner: Arc<Mutex<FormInner>>,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("FormState")
            .field("values", &inner.values)
            .field("errors", &inner.errors)
            .field("submitting", &inner.submitting)
            .finish_non_exhaustive()
    }
}

impl FormState {
    pub fn new(initial: Values) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FormInner {
                values: initial.clone(),
                ..Default::default()
            })),
            initial,
            rules: BTreeMap::new(),
            on_submit: None,
        }
    }

    /// 以可序列化结构作为初始值，结构必须序列化为 JSON 对象
    pub fn from_serialize<T: Serialize>(initial: &T) -> serde_json::Result<Self> {
        let values = match serde_json::to_value(initial)? {
            Value::Object(map) => map,
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "表单初始值必须是对象，实际为 {}",
                    other
                )));
            }
        };
        Ok(Self::new(values))
    }

    pub fn with_rules(mut self, field: impl Into<String>, rules: Vec<FieldRule>) -> Self {
        self.rules.insert(field.into(), rules);
        self
    }

    pub fn on_submit<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Values) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_submit = Some(Arc::new(move |values| handler(values).boxed()));
        self
    }

    // ==================== 状态读取 ====================

    pub fn values(&self) -> Values {
        self.inner.lock().values.clone()
    }

    /// 将当前值反序列化为具体结构
    pub fn values_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.values()))
    }

    pub fn value(&self, field: &str) -> Option<Value> {
        self.inner.lock().values.get(field).cloned()
    }

    pub fn errors(&self) -> BTreeMap<String, String> {
        self.inner.lock().errors.clone()
    }

    pub fn error(&self, field: &str) -> Option<String> {
        self.inner.lock().errors.get(field).cloned()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.inner.lock().touched.contains(field)
    }

    pub fn touched(&self) -> BTreeSet<String> {
        self.inner.lock().touched.clone()
    }

    pub fn submitting(&self) -> bool {
        self.inner.lock().submitting
    }

    /// 没有任何字段错误
    pub fn is_valid(&self) -> bool {
        self.inner.lock().errors.is_empty()
    }

    /// 任一字段被触碰过
    pub fn is_dirty(&self) -> bool {
        !self.inner.lock().touched.is_empty()
    }

    // ==================== 修改 ====================

    /// 设置字段值并标记为已触碰
    pub fn set_field_value(&self, field: &str, value: impl Into<Value>) {
        let mut inner = self.inner.lock();
        inner.values.insert(field.to_string(), value.into());
        inner.touched.insert(field.to_string());
    }

    pub fn set_field_error(&self, field: &str, message: impl Into<String>) {
        self.inner
            .lock()
            .errors
            .insert(field.to_string(), message.into());
    }

    pub fn clear_field_error(&self, field: &str) {
        self.inner.lock().errors.remove(field);
    }

    /// 恢复初始值并清空错误与触碰标记，不重新校验
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.values = self.initial.clone();
        inner.errors.clear();
        inner.touched.clear();
    }

    // ==================== 校验与提交 ====================

    /// 校验单个字段；没有规则的字段总是有效
    pub async fn validate_field(&self, field: &str) -> bool {
        let Some(rules) = self.rules.get(field) else {
            return true;
        };
        let value = self.value(field).unwrap_or(Value::Null);

        for rule in rules {
            if let Some(message) = rule.check(&value).await {
                debug!(field, message = %message, "字段校验失败");
                self.set_field_error(field, message);
                return false;
            }
        }

        self.clear_field_error(field);
        true
    }

    /// 并发校验所有带规则的字段，全部通过才返回 true
    pub async fn validate(&self) -> bool {
        let results = join_all(self.rules.keys().map(|field| self.validate_field(field))).await;
        results.into_iter().all(|ok| ok)
    }

    /// 失焦：标记触碰后校验该字段
    pub async fn handle_blur(&self, field: &str) -> bool {
        self.inner.lock().touched.insert(field.to_string());
        self.validate_field(field).await
    }

    /// 校验通过后调用提交处理函数
    ///
    /// 校验失败时不调用处理函数并返回 false；处理函数的错误只记录日志，返回 false。
    pub async fn submit(&self) -> bool {
        if !self.validate().await {
            return false;
        }

        let Some(handler) = &self.on_submit else {
            return true;
        };

        let values = {
            let mut inner = self.inner.lock();
            inner.submitting = true;
            inner.values.clone()
        };
        let _guard = SubmittingGuard(self.inner.clone());

        match handler(values).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "表单提交失败");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn values(v: Value) -> Values {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_required_field() {
        let form = FormState::new(values(json!({"name": ""})))
            .with_rules("name", vec![FieldRule::new().required()]);

        assert!(!form.validate_field("name").await);
        assert_eq!(form.error("name").as_deref(), Some("此字段为必填项"));

        form.set_field_value("name", "双十一");
        assert!(form.validate_field("name").await);
        assert_eq!(form.error("name"), None);
        assert!(form.is_valid());
    }

    #[tokio::test]
    async fn test_missing_value_counts_as_blank() {
        let form = FormState::new(Values::new())
            .with_rules("budget", vec![FieldRule::new().required().message("请输入预算")]);
        assert!(!form.validate().await);
        assert_eq!(form.error("budget").as_deref(), Some("请输入预算"));
    }

    #[tokio::test]
    async fn test_rule_order_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let rule = FieldRule::new()
            .required()
            .pattern(Regex::new("^[a-z]+$").unwrap())
            .min(3)
            .validator(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { true }
            });

        assert_eq!(rule.check(&json!("")).await.as_deref(), Some("此字段为必填项"));
        assert_eq!(rule.check(&json!("AB")).await.as_deref(), Some("格式不正确"));
        assert_eq!(rule.check(&json!("ab")).await.as_deref(), Some("最少 3 个字符"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(rule.check(&json!("abc")).await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_min_max_by_value_type() {
        let rule = FieldRule::new().min(1).max(100);
        assert_eq!(rule.check(&json!(0)).await.as_deref(), Some("最小值为 1"));
        assert_eq!(rule.check(&json!(100.5)).await.as_deref(), Some("最大值为 100"));
        assert_eq!(rule.check(&json!(50)).await, None);

        let rule = FieldRule::new().max(4);
        assert_eq!(rule.check(&json!("巨量引擎平台")).await.as_deref(), Some("最多 4 个字符"));
        assert_eq!(rule.check(&json!("巨量引擎")).await, None);
        // 非字符串非数值不参与长度检查
        assert_eq!(rule.check(&json!(true)).await, None);
    }

    #[tokio::test]
    async fn test_validator_verdicts() {
        let rule = FieldRule::new().validator(|v: Value| async move {
            match v.as_str() {
                Some("taken") => Verdict::from("用户名已存在"),
                Some("bad") => Verdict::Invalid,
                _ => Verdict::Valid,
            }
        });
        assert_eq!(rule.check(&json!("taken")).await.as_deref(), Some("用户名已存在"));
        assert_eq!(rule.check(&json!("bad")).await.as_deref(), Some("验证失败"));
        assert_eq!(rule.check(&json!("ok")).await, None);

        let rule = FieldRule::new().message("不可用").validator(|_| async { false });
        assert_eq!(rule.check(&json!("x")).await.as_deref(), Some("不可用"));
    }

    #[tokio::test]
    async fn test_validate_field_is_idempotent() {
        let form = FormState::new(values(json!({"name": "ab"})))
            .with_rules("name", vec![FieldRule::new().min(3)]);

        assert!(!form.validate_field("name").await);
        let first = form.errors();
        assert!(!form.validate_field("name").await);
        assert_eq!(form.errors(), first);
    }

    #[tokio::test]
    async fn test_fields_without_rules_are_valid() {
        let form = FormState::new(values(json!({"remark": ""})));
        assert!(form.validate_field("remark").await);
        assert!(form.validate().await);
    }

    #[tokio::test]
    async fn test_reset_restores_initial_values() {
        let initial = values(json!({"name": "初始", "budget": 100, "tags": ["a"]}));
        let form = FormState::new(initial.clone())
            .with_rules("name", vec![FieldRule::new().max(2)]);

        form.set_field_value("budget", 300);
        form.set_field_value("tags", json!(["a", "b"]));
        form.validate().await;
        form.set_field_error("budget", "预算超限");
        assert!(form.is_dirty());

        form.reset();
        assert_eq!(form.values(), initial);
        assert!(form.errors().is_empty());
        assert!(form.touched().is_empty());
        assert!(!form.is_dirty());
    }

    #[tokio::test]
    async fn test_handle_blur_marks_touched_and_validates() {
        let form = FormState::new(values(json!({"email": ""})))
            .with_rules("email", vec![FieldRule::new().required()]);

        assert!(!form.handle_blur("email").await);
        assert!(form.is_touched("email"));
        assert!(form.error("email").is_some());
    }

    #[tokio::test]
    async fn test_submit_skips_handler_when_invalid() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let form = FormState::new(values(json!({"name": ""})))
            .with_rules("name", vec![FieldRule::new().required()])
            .on_submit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            });

        assert!(!form.submit().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_passes_values_and_resets_submitting() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct CampaignForm {
            name: String,
            budget: u32,
        }

        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let form = FormState::new(values(json!({"name": "春季", "budget": 500})))
            .on_submit(move |values| {
                *sink.lock() = Some(values);
                async { Ok(()) }
            });

        assert!(form.submit().await);
        assert!(!form.submitting());
        assert_eq!(received.lock().clone(), Some(form.values()));
        assert_eq!(
            form.values_as::<CampaignForm>().unwrap(),
            CampaignForm {
                name: "春季".into(),
                budget: 500
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitting_flag_during_handler_and_after_error() {
        let form = FormState::new(Values::new()).on_submit(|_| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            anyhow::bail!("后端拒绝")
        });

        let observer = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            form.submitting()
        };
        let (ok, during) = tokio::join!(form.submit(), observer);

        assert!(!ok);
        assert!(during);
        assert!(!form.submitting());
    }

    #[tokio::test]
    async fn test_submit_without_handler() {
        let form = FormState::new(values(json!({"a": 1})));
        assert!(form.submit().await);
    }

    #[test]
    fn test_from_serialize_requires_object() {
        #[derive(Serialize)]
        struct Login {
            username: String,
        }
        let form = FormState::from_serialize(&Login {
            username: "admin".into(),
        })
        .unwrap();
        assert_eq!(form.value("username"), Some(json!("admin")));

        assert!(FormState::from_serialize(&vec![1, 2]).is_err());
    }
}
