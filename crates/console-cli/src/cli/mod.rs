//! CLI 模块
//!
//! - `login` / `logout` / `refresh` / `whoami` - 会话管理
//! - `advertisers` / `campaigns` - 分页列表查询
//! - `balance` - 广告主余额
//! - `route` - 查看某个页面地址的守卫判定
//! - `theme` - 查看或切换主题模式
//!
//! # 使用示例
//!
//! ```bash
//! # 开发模式登录（不需要后端）
//! adconsole --mock --storage .adconsole.json login -u admin -p admin123
//!
//! # 查询启用中的广告主第 2 页
//! adconsole --storage .adconsole.json advertisers -s enable --page 2
//!
//! # 切换主题
//! adconsole --storage .adconsole.json theme --toggle
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
