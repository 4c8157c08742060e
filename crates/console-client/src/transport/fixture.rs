//! 开发模式夹具传输
//!
//! 只拦截登录、会话查询、登出三个接口，用内存夹具应答并模拟网络延迟；
//! 其他请求原样转发给内层传输。

use std::sync::Arc;
use std::time::{Duration, Instant};

use adconsole_shared::observability::metrics;
use adconsole_shared::storage::{KeyValueStorage, keys};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{ApiRequest, Method, Transport};
use crate::envelope::Envelope;
use crate::error::Result;

/// 夹具应答的模拟延迟
pub const MOCK_LATENCY: Duration = Duration::from_millis(200);

const MOCK_USERNAME: &str = "admin";
const MOCK_PASSWORD: &str = "admin123";
const MOCK_TOKEN_PREFIX: &str = "mock_";

#[derive(Debug, Default, Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub struct FixtureTransport {
    inner: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStorage>,
    latency: Duration,
}

impl FixtureTransport {
    pub fn new(inner: Arc<dyn Transport>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            inner,
            storage,
            latency: MOCK_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 命中夹具路由时返回应答，否则返回 None
    fn intercept(&self, request: &ApiRequest) -> Option<Envelope<Value>> {
        match (request.method, request.path.as_str()) {
            (Method::Post, "/auth/login") => {
                let credentials = request
                    .json()
                    .and_then(|body| Credentials::deserialize(body).ok())
                    .unwrap_or_default();
                Some(login(&credentials))
            }
            (Method::Get, "/auth/info") => {
                let token = self.storage.get(keys::ACCESS_TOKEN).unwrap_or_default();
                Some(user_info(&token))
            }
            (Method::Post, "/auth/logout") => Some(Envelope::success_empty()),
            _ => None,
        }
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn send(&self, request: ApiRequest) -> Result<Envelope<Value>> {
        let Some(envelope) = self.intercept(&request) else {
            return self.inner.send(request).await;
        };

        let started = Instant::now();
        tokio::time::sleep(self.latency).await;
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            code = envelope.code,
            "夹具应答"
        );
        metrics::record_api_request(request.method.as_str(), "mock", started.elapsed().as_secs_f64());
        Ok(envelope)
    }
}

fn login(credentials: &Credentials) -> Envelope<Value> {
    if credentials.username != MOCK_USERNAME || credentials.password != MOCK_PASSWORD {
        return Envelope::failure(401, "用户名或密码错误");
    }

    let now = Utc::now().timestamp_millis();
    Envelope::success(json!({
        "access_token": format!("{}access_token_{}", MOCK_TOKEN_PREFIX, now),
        "refresh_token": format!("{}refresh_token_{}", MOCK_TOKEN_PREFIX, now),
        "expires_in": 7200
    }))
}

fn user_info(token: &str) -> Envelope<Value> {
    if !token.starts_with(MOCK_TOKEN_PREFIX) {
        return Envelope::failure(401, "未登录或登录已过期");
    }

    Envelope::success(json!({
        "user": {
            "id": 1,
            "username": MOCK_USERNAME,
            "nickname": "管理员",
            "avatar": "",
            "email": "admin@oceanengine.com",
            "phone": "13800138000",
            "role": { "id": 1, "name": "超级管理员", "key": "admin" }
        },
        "permissions": ["*"]
    }))
}
