//! API 调用入口
//!
//! 在 [`Transport`] 之上提供泛型 `get/post/put/delete/upload`：解开信封得到 `T`，
//! 失败时上报到 [`ErrorReporter`] 后原样返回。

use std::sync::Arc;

use adconsole_shared::config::ApiConfig;
use adconsole_shared::storage::KeyValueStorage;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::api::{AdvertiserApi, AuthApi, CampaignApi, MaterialApi, ReportApi};
use crate::error::{ClientError, Result};
use crate::notify::ErrorReporter;
use crate::transport::{self, ApiRequest, Transport, UploadForm};

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    reporter: Option<ErrorReporter>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            reporter: None,
        }
    }

    /// 按配置构建传输链（含开发模式夹具）
    pub fn from_config(config: &ApiConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        Ok(Self::new(transport::build(config, storage)?))
    }

    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn reporter(&self) -> Option<&ErrorReporter> {
        self.reporter.as_ref()
    }

    /// 发送请求并解开信封
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let result = match self.transport.send(request).await {
            Ok(envelope) => envelope.into_data(),
            Err(e) => Err(e),
        };

        if let (Err(e), Some(reporter)) = (&result, &self.reporter) {
            reporter.report_api_error(e, Some(&path));
        }
        result
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::get(path).with_query(encode(query)?))
            .await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::post(path)).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).with_json(encode(body)?))
            .await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::put(path).with_json(encode(body)?))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::delete(path)).await
    }

    pub async fn delete_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::delete(path).with_query(encode(query)?))
            .await
    }

    /// multipart 上传
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: UploadForm) -> Result<T> {
        self.execute(ApiRequest::post(path).with_form(form)).await
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn advertisers(&self) -> AdvertiserApi {
        AdvertiserApi::new(self.clone())
    }

    pub fn campaigns(&self) -> CampaignApi {
        CampaignApi::new(self.clone())
    }

    pub fn reports(&self) -> ReportApi {
        ReportApi::new(self.clone())
    }

    pub fn materials(&self) -> MaterialApi {
        MaterialApi::new(self.clone())
    }
}

fn encode<V: Serialize + ?Sized>(value: &V) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Encode(e.to_string()))
}
