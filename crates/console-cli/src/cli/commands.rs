//! CLI 命令定义

use std::path::PathBuf;

use adconsole_client::ThemeMode;
use adconsole_shared::config::AppConfig;
use clap::{Parser, Subcommand};

/// 广告管理控制台命令行工具
#[derive(Parser, Debug)]
#[command(name = "adconsole")]
#[command(version, about = "巨量引擎管理平台命令行工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，覆盖配置文件 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 后端 API 基础地址，覆盖配置文件
    #[arg(long)]
    pub base_url: Option<String>,

    /// 开发模式：登录、用户信息、登出使用本地夹具应答
    #[arg(long)]
    pub mock: bool,

    /// 本地存储文件，令牌与设置在多次调用之间保留
    #[arg(long)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 命令行参数优先于配置文件与环境变量
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if self.mock {
            config.api.enable_mock = true;
        }
        if let Some(path) = &self.storage {
            config.storage.path = Some(path.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 账号密码登录
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// 显示当前登录用户与权限
    Whoami,

    /// 退出登录并清除本地令牌
    Logout,

    /// 使用刷新令牌换取新的访问令牌
    Refresh,

    /// 分页查询广告主
    Advertisers {
        /// 名称或 ID 关键字
        #[arg(short, long)]
        keyword: Option<String>,

        /// 状态过滤
        #[arg(short, long)]
        status: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        page_size: u32,
    },

    /// 分页查询广告计划
    Campaigns {
        #[arg(short, long)]
        advertiser_id: Option<i64>,

        #[arg(short, long)]
        status: Option<String>,

        /// 计划名称关键字
        #[arg(short, long)]
        name: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "20")]
        page_size: u32,
    },

    /// 查询广告主账户余额
    Balance {
        advertiser_id: i64,
    },

    /// 查看访问某个页面地址时的守卫判定
    ///
    /// 地址可带查询串，如 `/campaigns?status=enable`。
    Route {
        path: String,

        /// 页面要求的权限，满足其一即可
        #[arg(short, long)]
        require: Vec<String>,
    },

    /// 查看或切换主题模式
    Theme {
        /// 设置为指定模式 (light, dark, system)
        #[arg(long, conflicts_with = "toggle")]
        set: Option<ThemeMode>,

        /// 按 浅色 → 深色 → 跟随系统 循环切换
        #[arg(long)]
        toggle: bool,

        /// 假定系统处于深色模式
        #[arg(long)]
        system_dark: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::parse_from(["adconsole", "login", "-u", "admin", "-p", "admin123"]);
        match cli.command {
            Commands::Login { username, password } => {
                assert_eq!(username, "admin");
                assert_eq!(password, "admin123");
            }
            _ => panic!("预期 Login 命令"),
        }

        assert!(Cli::try_parse_from(["adconsole", "login", "-u", "admin"]).is_err());
    }

    #[test]
    fn test_cli_parse_advertisers() {
        let cli = Cli::parse_from(["adconsole", "advertisers"]);
        match cli.command {
            Commands::Advertisers {
                keyword,
                status,
                page,
                page_size,
            } => {
                assert!(keyword.is_none());
                assert!(status.is_none());
                assert_eq!(page, 1);
                assert_eq!(page_size, 20);
            }
            _ => panic!("预期 Advertisers 命令"),
        }

        let cli = Cli::parse_from([
            "adconsole",
            "advertisers",
            "-k",
            "品牌",
            "-s",
            "enable",
            "--page",
            "3",
            "--page-size",
            "50",
        ]);
        match cli.command {
            Commands::Advertisers {
                keyword,
                status,
                page,
                page_size,
            } => {
                assert_eq!(keyword.as_deref(), Some("品牌"));
                assert_eq!(status.as_deref(), Some("enable"));
                assert_eq!(page, 3);
                assert_eq!(page_size, 50);
            }
            _ => panic!("预期 Advertisers 命令"),
        }
    }

    #[test]
    fn test_cli_parse_route_and_theme() {
        let cli = Cli::parse_from([
            "adconsole",
            "route",
            "/reports?day=7",
            "-r",
            "report:view",
            "-r",
            "report:export",
        ]);
        match cli.command {
            Commands::Route { path, require } => {
                assert_eq!(path, "/reports?day=7");
                assert_eq!(require, vec!["report:view", "report:export"]);
            }
            _ => panic!("预期 Route 命令"),
        }

        let cli = Cli::parse_from(["adconsole", "theme", "--set", "dark"]);
        match cli.command {
            Commands::Theme { set, toggle, .. } => {
                assert_eq!(set, Some(ThemeMode::Dark));
                assert!(!toggle);
            }
            _ => panic!("预期 Theme 命令"),
        }

        assert!(Cli::try_parse_from(["adconsole", "theme", "--set", "blue"]).is_err());
        assert!(Cli::try_parse_from(["adconsole", "theme", "--set", "dark", "--toggle"]).is_err());
    }

    #[test]
    fn test_global_options_override_config() {
        let cli = Cli::parse_from([
            "adconsole",
            "--log-level",
            "debug",
            "--base-url",
            "https://ads.example.com/api/v1",
            "--mock",
            "--storage",
            "/tmp/adconsole.json",
            "whoami",
        ]);

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.api.base_url, "https://ads.example.com/api/v1");
        assert!(config.api.enable_mock);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/adconsole.json"))
        );
    }

    #[test]
    fn test_absent_options_keep_config() {
        let cli = Cli::parse_from(["adconsole", "logout"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.observability.log_level, "info");
        assert!(!config.api.enable_mock);
        assert!(config.storage.path.is_none());
    }
}
