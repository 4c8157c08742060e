//! 类型化 API
//!
//! 每个后端资源区域一个模块。每个方法恰好发起一次请求，不做重试、缓存或编排，
//! 错误即传输层错误。

pub mod advertiser;
pub mod auth;
pub mod campaign;
pub mod material;
pub mod report;

pub use advertiser::AdvertiserApi;
pub use auth::AuthApi;
pub use campaign::CampaignApi;
pub use material::MaterialApi;
pub use report::ReportApi;
