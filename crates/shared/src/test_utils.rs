//! 测试工具模块
//!
//! 提供各 crate 测试共用的后端响应构造器和测试数据生成器，
//! 保证测试中的 JSON 结构与真实后端保持一致。

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};

use crate::storage::{KeyValueStorage, MemoryStorage, keys};

// ==================== 信封构造 ====================

/// 构造成功信封 `{code: 0, message: "success", data}`
pub fn ok_envelope(data: Value) -> Value {
    json!({
        "code": 0,
        "message": "success",
        "data": data
    })
}

/// 构造失败信封 `{code, message, data: null}`
pub fn error_envelope(code: i64, message: &str) -> Value {
    json!({
        "code": code,
        "message": message,
        "data": Value::Null
    })
}

/// 构造分页数据 `{list, total, page, page_size}`
pub fn page_json(list: Vec<Value>, total: u64, page: u32, page_size: u32) -> Value {
    json!({
        "list": list,
        "total": total,
        "page": page,
        "page_size": page_size
    })
}

// ==================== 测试数据生成器 ====================

/// 测试数据生成器
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// 登录成功响应数据
    pub fn token_pair(suffix: &str) -> Value {
        json!({
            "access_token": format!("access-{}", suffix),
            "refresh_token": format!("refresh-{}", suffix),
            "expires_in": 7200
        })
    }

    /// 会话信息（用户 + 权限）
    pub fn user_info(username: &str, role_key: &str, permissions: &[&str]) -> Value {
        json!({
            "user": {
                "id": 1,
                "username": username,
                "nickname": format!("{}-nick", username),
                "avatar": "",
                "email": format!("{}@example.com", username),
                "phone": "13800138000",
                "role": { "id": 1, "name": role_key, "key": role_key }
            },
            "permissions": permissions
        })
    }

    /// 广告主列表项
    pub fn advertiser(id: i64) -> Value {
        json!({
            "id": id,
            "advertiser_id": 1_000_000 + id,
            "name": format!("广告主-{}", id),
            "company": "测试公司",
            "status": "STATUS_ENABLE",
            "balance": 1000.5,
            "valid_balance": 900.0,
            "created_at": Utc::now().to_rfc3339(),
            "last_sync_at": Utc::now().to_rfc3339()
        })
    }

    /// 广告组列表项
    pub fn campaign(id: i64, advertiser_id: i64) -> Value {
        json!({
            "id": id,
            "campaign_id": 7_000_000 + id,
            "advertiser_id": advertiser_id,
            "name": format!("广告组-{}", id),
            "budget_mode": "BUDGET_MODE_DAY",
            "budget": 500.0,
            "landing_type": "LINK",
            "status": "CAMPAIGN_STATUS_ENABLE",
            "opt_status": "ENABLE",
            "created_at": Utc::now().to_rfc3339()
        })
    }

    /// 生成 n 条广告主数据，id 从 start 开始
    pub fn advertisers(start: i64, n: usize) -> Vec<Value> {
        (0..n as i64).map(|i| Self::advertiser(start + i)).collect()
    }
}

// ==================== 存储辅助 ====================

/// 创建预置了令牌和权限的内存存储
pub fn storage_with_session(access: &str, refresh: &str, permissions: &[&str]) -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.set(keys::ACCESS_TOKEN, access).ok();
    storage.set(keys::REFRESH_TOKEN, refresh).ok();
    if let Ok(encoded) = serde_json::to_string(permissions) {
        storage.set(keys::PERMISSIONS, &encoded).ok();
    }
    storage
}

/// 以 trait 对象形式返回存储，便于直接注入
pub fn shared_storage(storage: &MemoryStorage) -> Arc<dyn KeyValueStorage> {
    Arc::new(storage.clone())
}
