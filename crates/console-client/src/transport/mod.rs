//! 传输层
//!
//! [`Transport`] 只负责把一次请求发出去并拿回原始信封，信封解包和错误上报由
//! [`crate::ApiClient`] 统一完成。开发模式下在真实传输外再包一层
//! [`FixtureTransport`]，由 [`build`] 在构造时决定，生产传输中不含任何夹具分支。

mod fixture;
mod http;

use std::sync::Arc;

use adconsole_shared::config::ApiConfig;
use adconsole_shared::storage::KeyValueStorage;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::envelope::Envelope;
use crate::error::Result;

pub use fixture::{FixtureTransport, MOCK_LATENCY};
pub use http::HttpTransport;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// 上传文件
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// multipart 表单：一个 `file` 部分加若干字符串字段
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub file: FilePart,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file: FilePart {
                file_name: file_name.into(),
                bytes,
                mime: None,
            },
            fields: Vec::new(),
        }
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.file.mime = Some(mime.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self,
        }
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(UploadForm),
}

/// 一次 API 请求
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// 相对 base_url 的路径，如 `/auth/login`
    pub path: String,
    /// GET/DELETE 的查询参数（JSON 对象）
    pub query: Option<Value>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_form(mut self, form: UploadForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// JSON 请求体（没有则为 None）
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// 传输接口
///
/// 成功拿到响应体即返回信封（无论 code 是否为 0）；超时、网络失败和非 2xx 状态返回错误。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Envelope<Value>>;
}

/// 按配置构建传输链
///
/// 令牌在每次发送时从 `storage` 读取，传输层从不修改令牌。
pub fn build(config: &ApiConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Arc<dyn Transport>> {
    let http: Arc<dyn Transport> = Arc::new(HttpTransport::new(config, storage.clone())?);

    if config.enable_mock {
        info!(base_url = %config.base_url, "开发模式已启用，登录/会话/登出接口使用本地夹具");
        let fixture = FixtureTransport::new(http, storage).with_latency(config.mock_latency());
        return Ok(Arc::new(fixture));
    }

    Ok(http)
}
