//! 统一错误处理模块
//!
//! 定义共享基础设施（配置、本地存储）的错误类型，使用 thiserror 提供良好的错误信息。

use std::path::PathBuf;

use thiserror::Error;

/// 共享基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    // ==================== 配置错误 ====================
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    // ==================== 存储错误 ====================
    #[error("存储文件读写失败: {path}: {source}")]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("存储数据格式错误: {0}")]
    StorageFormat(#[from] serde_json::Error),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::StorageIo { .. } => "STORAGE_IO_ERROR",
            Self::StorageFormat(_) => "STORAGE_FORMAT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
