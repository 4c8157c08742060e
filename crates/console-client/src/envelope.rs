//! 响应信封与分页结构
//!
//! 后端所有响应都包在 `{code, message, data}` 信封中，`code == 0` 表示成功。

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ClientError, Result};

/// API 统一响应信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> Envelope<T> {
    /// 创建成功信封
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
            request_id: None,
        }
    }

    /// 创建成功信封（无数据）
    pub fn success_empty() -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: None,
            request_id: None,
        }
    }

    /// 创建失败信封
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            request_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl Envelope<Value> {
    /// 解开信封：成功时只返回 data（缺失视为 null），失败时返回携带 message 的业务错误
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(ClientError::api(self.code, self.message));
        }
        Ok(serde_json::from_value(self.data.unwrap_or(Value::Null))?)
    }
}

/// 分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub list: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PageResponse<T> {
    pub fn new(list: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            list,
            total,
            page,
            page_size,
        }
    }

    /// 创建空分页响应
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.page_size)
    }
}

/// `ceil(total / page_size)`，page_size 为 0 时返回 0
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(u64::from(page_size))
    }
}

/// 分页查询参数：过滤条件与分页游标平铺在同一层
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageQuery<P> {
    #[serde(flatten)]
    pub filters: P,
    pub page: u32,
    pub page_size: u32,
}

impl<P> PageQuery<P> {
    pub fn new(filters: P, page: u32, page_size: u32) -> Self {
        Self {
            filters,
            page,
            page_size,
        }
    }
}

/// 局部合并过滤条件
///
/// `patch` 中出现的字段覆盖当前值，未出现的保持不变。
pub trait MergeParams {
    fn merge(&mut self, patch: Self);
}

impl MergeParams for serde_json::Map<String, Value> {
    fn merge(&mut self, patch: Self) {
        self.extend(patch);
    }
}

impl MergeParams for () {
    fn merge(&mut self, _patch: Self) {}
}

/// 为全部字段都是 `Option` 的过滤结构实现 [`MergeParams`]
#[macro_export]
macro_rules! impl_merge_params {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::envelope::MergeParams for $ty {
            fn merge(&mut self, patch: Self) {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                    }
                )+
            }
        }
    };
}
