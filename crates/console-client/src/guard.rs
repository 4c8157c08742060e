//! 路由守卫
//!
//! 对一次导航给出放行或重定向的决定：白名单直接放行（已登录访问登录页回首页），
//! 未登录跳转登录页并带上原地址，缺少权限跳转 403。

use url::form_urlencoded;

use crate::session::{LOGIN_PATH, SessionStore};

/// 无需登录即可访问的路径
pub const WHITELIST: [&str; 3] = [LOGIN_PATH, "/403", "/404"];

pub const FORBIDDEN_PATH: &str = "/403";

pub const PLATFORM_NAME: &str = "巨量引擎管理平台";

/// 通配权限，持有者通过所有权限检查
pub const WILDCARD_PERMISSION: &str = "*";

/// 导航目标
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteTarget {
    pub path: String,
    /// 含查询串的完整地址，用于登录后回跳
    pub full_path: String,
    pub title: Option<String>,
    /// 满足其一即可访问
    pub permissions: Vec<String>,
}

impl RouteTarget {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            full_path: path.clone(),
            path,
            ..Default::default()
        }
    }

    pub fn with_full_path(mut self, full_path: impl Into<String>) -> Self {
        self.full_path = full_path.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn require(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn check(&self, target: &RouteTarget) -> GuardDecision {
        let logged_in = self.session.is_logged_in();

        if WHITELIST.contains(&target.path.as_str()) {
            if target.path == LOGIN_PATH && logged_in {
                return GuardDecision::Redirect("/".to_string());
            }
            return GuardDecision::Allow;
        }

        if !logged_in {
            return GuardDecision::Redirect(login_redirect(&target.full_path));
        }

        if !target.permissions.is_empty()
            && !self.session.has_permission([WILDCARD_PERMISSION])
            && !self.session.has_permission(&target.permissions)
        {
            return GuardDecision::Redirect(FORBIDDEN_PATH.to_string());
        }

        GuardDecision::Allow
    }
}

/// `/login?redirect=<原地址>`
pub fn login_redirect(full_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", full_path)
        .finish();
    format!("{}?{}", LOGIN_PATH, query)
}

/// 页面标题：`<title> - 巨量引擎管理平台`，无标题时只显示平台名
pub fn document_title(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} - {}", t, PLATFORM_NAME),
        _ => PLATFORM_NAME.to_string(),
    }
}
