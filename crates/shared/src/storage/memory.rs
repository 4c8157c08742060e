//! 内存存储
//!
//! 使用 DashMap 实现的并发安全内存存储，适用于测试和开发环境。

use dashmap::DashMap;
use std::sync::Arc;

use super::KeyValueStorage;
use crate::error::Result;

/// 进程内键值存储
///
/// Clone 后共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以初始键值对创建，便于测试预置持久化状态
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        for (key, value) in entries {
            storage.data.insert(key.into(), value.into());
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.data.iter().map(|entry| entry.key().clone()).collect()
    }
}
