//! 会话存储
//!
//! 持有访问令牌、刷新令牌、当前用户与权限集合。进程内以本结构为准，
//! 令牌和权限的每次变更都同步写入持久化存储，构造时从持久化存储恢复。
//!
//! 状态机：
//! - `Anonymous` --login 成功--> `Authenticated`
//! - `Authenticated` --refresh--> `Refreshing` --成功--> `Authenticated`
//! - `Refreshing` --失败--> `Anonymous`
//! - 任意状态 --logout--> `Anonymous`

use std::sync::Arc;

use adconsole_shared::storage::{KeyValueStorage, keys};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::api::auth::{LoginRequest, TokenPair, UserInfo};
use crate::error::{ClientError, Result};

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
}

/// 登出后跳转登录页
pub trait LoginRedirect: Send + Sync {
    fn to_login(&self);
}

/// 只记录日志的跳转实现，用于没有界面导航的宿主
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn to_login(&self) {
        info!(path = LOGIN_PATH, "会话已结束，跳转登录页");
    }
}

#[derive(Debug, Default)]
struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserInfo>,
    permissions: Vec<String>,
    refreshing: bool,
    /// 每次清空会话加一，在途的登录与刷新据此判断结果是否作废
    epoch: u64,
}

/// 刷新结束或被取消时复位 `refreshing`，会话已被清空时不动
struct RefreshingGuard<'a> {
    inner: &'a RwLock<Session>,
    epoch: u64,
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.inner.write();
        if session.epoch == self.epoch {
            session.refreshing = false;
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    api: AuthApi,
    storage: Arc<dyn KeyValueStorage>,
    redirect: Arc<dyn LoginRedirect>,
    inner: Arc<RwLock<Session>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// 创建会话存储并同步恢复持久化的令牌与权限
    pub fn new(
        api: AuthApi,
        storage: Arc<dyn KeyValueStorage>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let permissions = match storage.get(keys::PERMISSIONS) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "持久化的权限列表无法解析，按空处理");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let session = Session {
            access_token: storage.get(keys::ACCESS_TOKEN).filter(|t| !t.is_empty()),
            refresh_token: storage.get(keys::REFRESH_TOKEN).filter(|t| !t.is_empty()),
            user: None,
            permissions,
            refreshing: false,
            epoch: 0,
        };

        Self {
            api,
            storage,
            redirect,
            inner: Arc::new(RwLock::new(session)),
        }
    }

    // ==================== 操作 ====================

    /// 登录：保存令牌后拉取用户信息
    ///
    /// 登录接口失败时原有状态不变；用户信息拉取失败时会话被清空。
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let epoch = self.epoch();
        let tokens = self
            .api
            .login(&LoginRequest::new(username, password))
            .await
            .inspect_err(|e| warn!(username, error = %e, "登录失败"))?;

        if !self.set_tokens_if_current(epoch, tokens) {
            warn!(username, "登录期间会话被清除，丢弃令牌");
            return Err(ClientError::SessionCleared);
        }
        self.fetch_user_info().await?;

        info!(username, "登录成功");
        Ok(())
    }

    /// 重新拉取用户信息与权限，失败时清空会话
    pub async fn fetch_user_info(&self) -> Result<()> {
        let epoch = self.epoch();
        match self.api.user_info().await {
            Ok(info) => {
                let mut session = self.inner.write();
                if session.epoch != epoch {
                    debug!("拉取用户信息期间会话被清除，丢弃结果");
                    return Err(ClientError::SessionCleared);
                }
                self.persist(
                    keys::PERMISSIONS,
                    serde_json::to_string(&info.permissions).ok().as_deref(),
                );
                session.user = Some(info.user);
                session.permissions = info.permissions;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "获取用户信息失败，清空会话");
                if self.epoch() == epoch {
                    self.clear();
                }
                Err(e)
            }
        }
    }

    /// 用刷新令牌换取新的令牌对，失败时清空会话
    pub async fn refresh(&self) -> Result<()> {
        let (refresh_token, epoch) = {
            let mut session = self.inner.write();
            let token = session
                .refresh_token
                .clone()
                .ok_or(ClientError::NoRefreshToken)?;
            session.refreshing = true;
            (token, session.epoch)
        };
        let _refreshing = RefreshingGuard {
            inner: &self.inner,
            epoch,
        };

        let result = self.api.refresh_token(&refresh_token).await;

        if self.epoch() != epoch {
            debug!("刷新期间会话被清除，丢弃刷新结果");
            return Err(ClientError::SessionCleared);
        }

        match result {
            Ok(tokens) => {
                if !self.set_tokens_if_current(epoch, tokens) {
                    return Err(ClientError::SessionCleared);
                }
                debug!("令牌已刷新");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "刷新令牌失败，清空会话");
                self.clear();
                Err(e)
            }
        }
    }

    /// 登出：服务端登出失败不影响本地清理，最后跳转登录页
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "服务端登出失败，忽略");
        }
        self.clear();
        self.redirect.to_login();
    }

    /// 清空内存与持久化的会话数据
    pub fn clear(&self) {
        let mut session = self.inner.write();
        *session = Session {
            epoch: session.epoch + 1,
            ..Session::default()
        };
        self.persist(keys::ACCESS_TOKEN, None);
        self.persist(keys::REFRESH_TOKEN, None);
        self.persist(keys::PERMISSIONS, None);
    }

    /// 任一所需权限在权限集合中即返回 true
    pub fn has_permission<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let session = self.inner.read();
        required
            .into_iter()
            .any(|p| session.permissions.iter().any(|owned| owned == p.as_ref()))
    }

    // ==================== 访问器 ====================

    pub fn state(&self) -> SessionState {
        let session = self.inner.read();
        if session.refreshing {
            SessionState::Refreshing
        } else if session.access_token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.read().access_token.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.inner.read().user.clone()
    }

    pub fn username(&self) -> String {
        self.inner
            .read()
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    /// 昵称为空时回退到用户名
    pub fn nickname(&self) -> String {
        match self.inner.read().user.as_ref() {
            Some(u) if !u.nickname.is_empty() => u.nickname.clone(),
            Some(u) => u.username.clone(),
            None => String::new(),
        }
    }

    pub fn permissions(&self) -> Vec<String> {
        self.inner.read().permissions.clone()
    }

    // ==================== 内部 ====================

    fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    /// 会话自 `epoch` 起未被清空时写入令牌，否则丢弃并返回 false
    fn set_tokens_if_current(&self, epoch: u64, tokens: TokenPair) -> bool {
        let mut session = self.inner.write();
        if session.epoch != epoch {
            return false;
        }
        self.persist(keys::ACCESS_TOKEN, Some(&tokens.access_token));
        self.persist(keys::REFRESH_TOKEN, Some(&tokens.refresh_token));
        session.access_token = Some(tokens.access_token);
        session.refresh_token = Some(tokens.refresh_token);
        true
    }

    /// 持久化失败只记录日志，内存中的会话仍然有效
    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.storage.set(key, v),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "会话数据写入存储失败");
        }
    }
}
