//! 认证接口

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha_code: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_captcha(mut self, id: impl Into<String>, code: impl Into<String>) -> Self {
        self.captcha_id = Some(id.into());
        self.captcha_code = Some(code.into());
        self
    }
}

/// 登录/刷新返回的令牌对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 有效期（秒）
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
}

/// 当前会话：用户信息与权限集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user: UserInfo,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Captcha {
    pub captcha_id: String,
    /// base64 图片
    pub captcha_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair> {
        self.client.post_json("/auth/login", request).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.client.post("/auth/logout").await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        self.client
            .post_json("/auth/refresh", &RefreshRequest { refresh_token })
            .await
    }

    pub async fn user_info(&self) -> Result<SessionInfo> {
        self.client.get("/auth/info").await
    }

    pub async fn captcha(&self) -> Result<Captcha> {
        self.client.get("/auth/captcha").await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        self.client.post_json("/auth/password", request).await
    }
}
