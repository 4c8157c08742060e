//! 错误通知
//!
//! 保留最近 50 条用户可见的错误，最新的在前；同时广播给订阅者（界面层的提示通道）。

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::ClientError;

/// 历史记录上限
pub const MAX_HISTORY: usize = 50;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// 业务失败或请求失败
    Api,
    /// 网络层失败（状态码、超时、连接）
    Network,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub code: Option<i64>,
    pub kind: ErrorKind,
    pub timestamp: DateTime<Utc>,
    /// 出错请求的路径
    pub url: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            kind,
            timestamp: Utc::now(),
            url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    history: Arc<Mutex<VecDeque<ErrorInfo>>>,
    sender: broadcast::Sender<ErrorInfo>,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            history: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_HISTORY))),
            sender,
        }
    }

    /// 记录并广播一条错误
    pub fn report(&self, info: ErrorInfo) {
        {
            let mut history = self.history.lock();
            history.push_front(info.clone());
            history.truncate(MAX_HISTORY);
        }
        // 没有订阅者时发送失败，忽略即可
        let _ = self.sender.send(info);
    }

    /// 上报一次客户端请求失败
    pub fn report_api_error(&self, err: &ClientError, url: Option<&str>) -> ErrorInfo {
        let kind = if err.is_transport() {
            ErrorKind::Network
        } else {
            ErrorKind::Api
        };
        let info = ErrorInfo {
            code: err.code(),
            url: url.map(str::to_string),
            ..ErrorInfo::new(kind, err.to_string())
        };
        self.report(info.clone());
        info
    }

    /// 历史记录快照（最新在前）
    pub fn history(&self) -> Vec<ErrorInfo> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.history.lock().clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ErrorInfo> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_newest_first_and_bounded() {
        let reporter = ErrorReporter::new();
        for i in 0..60 {
            reporter.report_api_error(&ClientError::api(500, format!("error-{}", i)), None);
        }

        let history = reporter.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].message, "error-59");
        assert_eq!(history[MAX_HISTORY - 1].message, "error-10");

        reporter.clear();
        assert!(reporter.history().is_empty());
    }

    #[test]
    fn test_classification() {
        let reporter = ErrorReporter::new();

        let info = reporter.report_api_error(&ClientError::api(1001, "余额不足"), Some("/campaign"));
        assert_eq!(info.kind, ErrorKind::Api);
        assert_eq!(info.code, Some(1001));
        assert_eq!(info.url.as_deref(), Some("/campaign"));

        let info = reporter.report_api_error(&ClientError::Timeout, None);
        assert_eq!(info.kind, ErrorKind::Network);
        assert_eq!(info.message, "请求超时");

        let info = reporter.report_api_error(&ClientError::http(503, None), Some("/report"));
        assert_eq!(info.kind, ErrorKind::Network);
        assert_eq!(info.message, "服务不可用");
        assert_eq!(info.code, Some(503));
    }

    #[tokio::test]
    async fn test_subscribers_receive_reports() {
        let reporter = ErrorReporter::new();
        let mut rx = reporter.subscribe();

        reporter.report_api_error(&ClientError::api(401, "未登录或登录已过期"), Some("/auth/info"));

        let info = rx.recv().await.unwrap();
        assert_eq!(info.message, "未登录或登录已过期");
    }
}
