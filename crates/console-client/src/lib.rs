//! 广告管理控制台客户端
//!
//! 对后端 REST API 的类型化访问层，以及登录会话生命周期管理。
//!
//! ## 核心功能
//!
//! - **传输层**：HTTP 调用、Bearer 令牌注入、`{code, message, data}` 信封解析、网络错误归一化
//! - **API 模块**：每个后端资源区域一个模块，每个方法恰好对应一次 HTTP 调用
//! - **会话存储**：访问/刷新令牌、当前用户与权限集合，变更即时写入本地存储
//! - **路由守卫**：白名单、登录态与权限判定
//! - **设置服务**：主题模式与命名空间下的通用设置
//! - **错误通知**：所有请求失败都会进入可订阅的通知通道
//!
//! ## 模块结构
//!
//! - `transport`: 传输接口、HTTP 实现与开发模式夹具
//! - `client`: 泛型 `get/post/put/delete/upload` 调用入口
//! - `envelope`: 响应信封与分页结构
//! - `api`: 各资源区域的类型化 API
//! - `session`: 会话存储
//! - `guard`: 路由守卫
//! - `settings`: 设置服务
//! - `notify`: 错误通知
//! - `error`: 错误类型定义

pub mod api;
pub mod client;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod notify;
pub mod query;
pub mod session;
pub mod settings;
pub mod transport;

pub use client::ApiClient;
pub use envelope::{Envelope, MergeParams, PageQuery, PageResponse};
pub use error::{ClientError, Result};
pub use guard::{GuardDecision, RouteGuard, RouteTarget};
pub use notify::{ErrorInfo, ErrorKind, ErrorReporter};
pub use session::{LoginRedirect, SessionState, SessionStore};
pub use settings::{SettingsService, ThemeMode};
pub use transport::{ApiRequest, FilePart, Method, RequestBody, Transport, UploadForm};
