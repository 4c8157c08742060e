//! 共享库
//!
//! 包含控制台各 crate 共用的配置加载、错误类型、本地持久化存储、可观测性初始化与测试工具。

pub mod config;
pub mod error;
pub mod observability;
pub mod storage;
pub mod test_utils;

pub use error::{Result, SharedError};
