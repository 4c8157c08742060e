//! 本地持久化存储
//!
//! 会话令牌、权限列表和应用设置的落地位置。存储只是缓存：
//! 进程存活期间，会话以内存中的会话存储为准。
//!
//! - [`MemoryStorage`]：进程内存储，用于测试和不需要跨进程保留会话的场景
//! - [`FileStorage`]：JSON 文件存储，每次修改整体重写文件
//! - [`PrefixedStorage`]：在任一存储之上加命名空间前缀，值以 JSON 编码

mod file;
mod memory;
mod prefixed;

use std::fmt::Debug;
use std::sync::Arc;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use prefixed::PrefixedStorage;

use crate::config::StorageConfig;
use crate::error::Result;

/// 会话相关的固定键名（不带命名空间前缀）
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// JSON 编码的字符串数组
    pub const PERMISSIONS: &str = "permissions";
}

/// 字符串键值存储接口
///
/// 读操作不会失败（读取不到即视为不存在），写操作可能因落盘失败返回错误。
pub trait KeyValueStorage: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Vec<String>;
}

/// 按配置打开存储：配置了文件路径则使用文件存储，否则使用内存存储
pub fn open(config: &StorageConfig) -> Result<Arc<dyn KeyValueStorage>> {
    match &config.path {
        Some(path) => Ok(Arc::new(FileStorage::open(path)?)),
        None => Ok(Arc::new(MemoryStorage::new())),
    }
}
