//! 广告管理控制台命令行工具
//!
//! 在终端中完成登录、会话查看、列表查询与主题设置，
//! 直接复用客户端与视图状态 crate，不依赖任何界面框架。

pub mod cli;
