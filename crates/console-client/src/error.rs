//! 客户端错误类型定义
//!
//! 请求链路上所有可能的失败：业务信封失败、HTTP/网络失败、编解码失败与会话失败。
//! 错误需要在通知通道和请求状态中多处保存，所以只携带字符串信息以保持 `Clone`。

use adconsole_shared::SharedError;

/// 信封 message 为空时的兜底提示
pub const FALLBACK_MESSAGE: &str = "请求失败";

/// 客户端错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    // 业务错误：HTTP 交互成功，但信封 code 非 0
    #[error("{message}")]
    Api { code: i64, message: String },

    // 传输错误
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("请求超时")]
    Timeout,
    #[error("网络错误: {0}")]
    Network(String),

    // 编解码错误
    #[error("响应解析失败: {0}")]
    Decode(String),
    #[error("请求参数序列化失败: {0}")]
    Encode(String),

    // 会话错误
    #[error("缺少刷新令牌")]
    NoRefreshToken,
    #[error("会话已被清除")]
    SessionCleared,
    #[error("本地存储错误: {0}")]
    Storage(String),
}

impl ClientError {
    /// 由信封构造业务错误，message 为空时使用兜底提示
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Api {
            code,
            message: if message.is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                message
            },
        }
    }

    /// 由 HTTP 状态构造错误，优先使用响应体中携带的 message
    pub fn http(status: u16, embedded: Option<String>) -> Self {
        Self::Http {
            status,
            message: embedded
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status_message(status)),
        }
    }

    /// 业务码或 HTTP 状态码
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::Http { status, .. } => Some(i64::from(*status)),
            Self::Timeout => Some(408),
            _ => None,
        }
    }

    /// 返回错误码（用于日志与通知分类）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api { .. } => "API_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Encode(_) => "ENCODE_ERROR",
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::SessionCleared => "SESSION_CLEARED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// 是否为传输层（非业务）失败
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Timeout | Self::Network(_))
    }

    /// 是否为未授权（业务码或 HTTP 状态为 401）
    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(401)
    }
}

impl From<SharedError> for ClientError {
    fn from(err: SharedError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// 没有可用 message 时按 HTTP 状态给出的提示
pub fn status_message(status: u16) -> String {
    let message = match status {
        400 => "请求参数错误",
        401 => "未授权，请重新登录",
        403 => "拒绝访问",
        404 => "请求资源不存在",
        408 => "请求超时",
        500 => "服务器内部错误",
        501 => "服务未实现",
        502 => "网关错误",
        503 => "服务不可用",
        504 => "网关超时",
        other => return format!("连接错误 {}", other),
    };
    message.to_string()
}

/// 客户端 Result 类型别名
pub type Result<T> = std::result::Result<T, ClientError>;
