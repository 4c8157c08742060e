//! 命名空间存储
//!
//! 所有键自动加上前缀，值以 JSON 编码。读取失败（不存在或无法解析）统一返回 None。

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use super::KeyValueStorage;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PrefixedStorage {
    inner: Arc<dyn KeyValueStorage>,
    prefix: String,
}

impl PrefixedStorage {
    pub fn new(inner: Arc<dyn KeyValueStorage>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.inner.get(&self.full_key(key))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "存储值无法解析，按不存在处理");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.inner.set(&self.full_key(key), &raw)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(&self.full_key(key))
    }

    /// 只清除带本前缀的键，不影响同一存储中的其他数据
    pub fn clear(&self) -> Result<()> {
        for key in self.inner.keys() {
            if key.starts_with(&self.prefix) {
                self.inner.remove(&key)?;
            }
        }
        Ok(())
    }
}
