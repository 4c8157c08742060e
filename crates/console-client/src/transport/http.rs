//! 基于 reqwest 的 HTTP 传输

use std::sync::Arc;
use std::time::Instant;

use adconsole_shared::config::ApiConfig;
use adconsole_shared::observability::metrics;
use adconsole_shared::storage::{KeyValueStorage, keys};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiRequest, RequestBody, Transport, UploadForm};
use crate::envelope::Envelope;
use crate::error::{ClientError, Result};
use crate::query::to_pairs;

/// 每次请求生成的追踪 ID 请求头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 非 2xx 响应体中可能携带的错误信息
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn KeyValueStorage>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<Envelope<Value>> {
        let url = self.url(&request.path);
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(query) = &request.query {
            let pairs = to_pairs(query);
            if !pairs.is_empty() {
                builder = builder.query(&pairs);
            }
        }

        // 令牌为空时不附加请求头
        if let Some(token) = self
            .storage
            .get(keys::ACCESS_TOKEN)
            .filter(|t| !t.is_empty())
        {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(into_multipart(form)?),
        };

        debug!(
            method = request.method.as_str(),
            url = %url,
            request_id = %request_id,
            "发送 API 请求"
        );

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let embedded = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.message);
            return Err(ClientError::http(status.as_u16(), embedded));
        }

        serde_json::from_slice::<Envelope<Value>>(&body)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Envelope<Value>> {
        let method = request.method;
        let path = request.path.clone();
        let started = Instant::now();

        let result = self.dispatch(request).await;

        let outcome = match &result {
            Ok(envelope) if envelope.is_success() => "ok",
            Ok(_) => "envelope_error",
            Err(ClientError::Http { .. }) => "http_error",
            Err(ClientError::Timeout) => "timeout",
            Err(_) => "network_error",
        };
        metrics::record_api_request(method.as_str(), outcome, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            warn!(method = method.as_str(), path = %path, error = %e, "API 请求失败");
        }
        result
    }
}

fn into_multipart(form: UploadForm) -> Result<reqwest::multipart::Form> {
    let mut part = reqwest::multipart::Part::bytes(form.file.bytes).file_name(form.file.file_name);
    if let Some(mime) = &form.file.mime {
        part = part
            .mime_str(mime)
            .map_err(|e| ClientError::Encode(format!("无效的文件类型 {mime}: {e}")))?;
    }

    let mut multipart = reqwest::multipart::Form::new().part("file", part);
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    Ok(multipart)
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Network(err.to_string())
    }
}
