//! 命令执行器
//!
//! 持有一次进程内共享的客户端、会话、守卫与设置服务，把各子命令转化为对它们的调用。

use std::sync::Arc;

use adconsole_client::api::advertiser::{AdvertiserFilter, Balance};
use adconsole_client::api::campaign::CampaignFilter;
use adconsole_client::guard::document_title;
use adconsole_client::notify::ErrorInfo;
use adconsole_client::session::LogRedirect;
use adconsole_client::{
    ApiClient, ErrorReporter, GuardDecision, PageQuery, RouteGuard, RouteTarget, SessionStore,
    SettingsService, ThemeMode,
};
use adconsole_shared::config::AppConfig;
use adconsole_shared::storage::{KeyValueStorage, PrefixedStorage};
use adconsole_state::form::rules;
use adconsole_state::{FormState, RequestState, TableState, Values};
use anyhow::{Context, Result, bail};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::commands::Commands;

pub struct CommandRunner {
    config: AppConfig,
    client: ApiClient,
    session: SessionStore,
    guard: RouteGuard,
    settings: SettingsService,
    toasts: broadcast::Receiver<ErrorInfo>,
}

impl CommandRunner {
    pub fn new(config: AppConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let reporter = ErrorReporter::new();
        let toasts = reporter.subscribe();

        let client = ApiClient::from_config(&config.api, storage.clone())
            .context("创建 API 客户端失败")?
            .with_reporter(reporter);
        let session = SessionStore::new(client.auth(), storage.clone(), Arc::new(LogRedirect));
        let guard = RouteGuard::new(session.clone());
        let settings = SettingsService::new(PrefixedStorage::new(
            storage,
            config.storage.key_prefix.clone(),
        ));

        Ok(Self {
            config,
            client,
            session,
            guard,
            settings,
            toasts,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// 执行子命令，结束后把期间产生的错误通知输出到 stderr
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        debug!(?command, mock = self.config.api.enable_mock, "执行命令");
        let result = self.dispatch(command).await;
        self.flush_toasts();
        result
    }

    async fn dispatch(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Login { username, password } => self.run_login(&username, &password).await,
            Commands::Whoami => self.run_whoami().await,
            Commands::Logout => {
                self.session.logout().await;
                println!("已退出登录");
                Ok(())
            }
            Commands::Refresh => {
                self.session.refresh().await.context("刷新令牌失败")?;
                println!("访问令牌已刷新");
                Ok(())
            }
            Commands::Advertisers {
                keyword,
                status,
                page,
                page_size,
            } => {
                self.run_advertisers(AdvertiserFilter { keyword, status }, page, page_size)
                    .await
            }
            Commands::Campaigns {
                advertiser_id,
                status,
                name,
                page,
                page_size,
            } => {
                let filter = CampaignFilter {
                    advertiser_id,
                    status,
                    name,
                };
                self.run_campaigns(filter, page, page_size).await
            }
            Commands::Balance { advertiser_id } => self.run_balance(advertiser_id).await,
            Commands::Route { path, require } => {
                self.run_route(&path, require);
                Ok(())
            }
            Commands::Theme {
                set,
                toggle,
                system_dark,
            } => {
                self.run_theme(set, toggle, system_dark);
                Ok(())
            }
        }
    }

    /// 登录前先按登录表单规则校验输入
    pub async fn run_login(&self, username: &str, password: &str) -> Result<()> {
        let form = FormState::new(Values::from_iter([
            ("username".to_string(), json!(username)),
            ("password".to_string(), json!(password)),
        ]))
        .with_rules("username", vec![rules::required(), rules::username()])
        .with_rules(
            "password",
            vec![rules::required().message("请输入密码"), rules::min_len(6)],
        );

        if !form.validate().await {
            for (field, message) in form.errors() {
                eprintln!("  {}: {}", field, message);
            }
            bail!("登录信息校验未通过");
        }

        self.session
            .login(username, password)
            .await
            .context("登录失败")?;

        info!(username, "登录成功");
        println!("登录成功，欢迎 {}", self.session.nickname());
        Ok(())
    }

    pub async fn run_whoami(&self) -> Result<()> {
        let target = RouteTarget::new("/").with_title("工作台");
        self.ensure_access(&target)?;

        self.session
            .fetch_user_info()
            .await
            .context("获取用户信息失败")?;

        println!("{}", document_title(target.title.as_deref()));
        println!("{}", "-".repeat(40));
        println!("用户名: {}", self.session.username());
        println!("昵称: {}", self.session.nickname());
        if let Some(user) = self.session.user() {
            println!("角色: {} ({})", user.role.name, user.role.key);
            if !user.email.is_empty() {
                println!("邮箱: {}", user.email);
            }
        }
        println!("权限: {}", self.session.permissions().join(", "));
        println!("{}", "-".repeat(40));
        Ok(())
    }

    pub async fn run_advertisers(
        &self,
        filter: AdvertiserFilter,
        page: u32,
        page_size: u32,
    ) -> Result<()> {
        self.ensure_access(&RouteTarget::new("/advertisers").with_title("广告主管理"))?;

        let api = self.client.advertisers();
        let table = TableState::new(
            move |query: PageQuery<AdvertiserFilter>| {
                let api = api.clone();
                async move { api.list(&query).await }
            },
            filter,
        )
        .with_page_size(page_size);
        load_page(&table, page).await;

        if let Some(err) = table.last_error() {
            return Err(anyhow::Error::new(err).context("查询广告主列表失败"));
        }

        println!(
            "{:>16}  {:<24} {:<10} {:>14}",
            "广告主 ID", "名称", "状态", "余额"
        );
        for advertiser in table.rows() {
            println!(
                "{:>16}  {:<24} {:<10} {:>14.2}",
                advertiser.advertiser_id, advertiser.name, advertiser.status, advertiser.balance
            );
        }
        print_footer(table.total(), table.page(), table.total_pages());
        Ok(())
    }

    pub async fn run_campaigns(&self, filter: CampaignFilter, page: u32, page_size: u32) -> Result<()> {
        self.ensure_access(&RouteTarget::new("/campaigns").with_title("广告计划"))?;

        let api = self.client.campaigns();
        let table = TableState::new(
            move |query: PageQuery<CampaignFilter>| {
                let api = api.clone();
                async move { api.list(&query).await }
            },
            filter,
        )
        .with_page_size(page_size);
        load_page(&table, page).await;

        if let Some(err) = table.last_error() {
            return Err(anyhow::Error::new(err).context("查询广告计划列表失败"));
        }

        println!(
            "{:>16}  {:<24} {:<16} {:>12}",
            "计划 ID", "名称", "状态", "预算"
        );
        for campaign in table.rows() {
            println!(
                "{:>16}  {:<24} {:<16} {:>12.2}",
                campaign.campaign_id, campaign.name, campaign.status, campaign.budget
            );
        }
        print_footer(table.total(), table.page(), table.total_pages());
        Ok(())
    }

    pub async fn run_balance(&self, advertiser_id: i64) -> Result<()> {
        let target = RouteTarget::new(format!("/advertisers/{}", advertiser_id))
            .with_title("广告主详情");
        self.ensure_access(&target)?;

        let api = self.client.advertisers();
        let request: RequestState<i64, Balance> = RequestState::new(move |id: i64| {
            let api = api.clone();
            async move { api.balance(id).await }
        });

        let Some(balance) = request.execute(advertiser_id).await else {
            let err = request
                .error()
                .map(anyhow::Error::new)
                .unwrap_or_else(|| anyhow::anyhow!("未返回余额数据"));
            return Err(err.context("查询余额失败"));
        };

        println!("广告主 {} 余额", advertiser_id);
        println!("  总余额: {:.2}", balance.balance);
        println!("  可用余额: {:.2}", balance.valid_balance);
        println!("  现金余额: {:.2}", balance.cash_balance);
        Ok(())
    }

    pub fn run_route(&self, full_path: &str, require: Vec<String>) {
        let path = full_path.split('?').next().unwrap_or(full_path);
        let mut target = RouteTarget::new(path).with_full_path(full_path);
        for permission in require {
            target = target.require(permission);
        }

        match self.guard.check(&target) {
            GuardDecision::Allow => println!("允许访问 {}", full_path),
            GuardDecision::Redirect(to) => println!("重定向到 {}", to),
        }
    }

    pub fn run_theme(&self, set: Option<ThemeMode>, toggle: bool, system_dark: bool) {
        self.settings.set_system_dark(system_dark);
        if let Some(mode) = set {
            self.settings.set_theme_mode(mode);
        } else if toggle {
            self.settings.toggle();
        }

        let palette = self.settings.palette();
        println!(
            "主题模式: {} ({})",
            self.settings.theme_label(),
            self.settings.theme_mode()
        );
        println!("当前主题: {}", self.settings.theme_name());
        println!("背景色: {}  主色: {}", palette.background, palette.primary);
    }

    /// 守卫拒绝时把跳转目标作为错误返回
    fn ensure_access(&self, target: &RouteTarget) -> Result<()> {
        match self.guard.check(target) {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Redirect(to) if to.starts_with(adconsole_client::session::LOGIN_PATH) => {
                bail!("未登录或登录已过期，请先执行 login（{}）", to)
            }
            GuardDecision::Redirect(to) => bail!("没有访问权限（{}）", to),
        }
    }

    fn flush_toasts(&mut self) {
        while let Ok(toast) = self.toasts.try_recv() {
            match toast.code {
                Some(code) => eprintln!("[{:?}] {} (code {})", toast.kind, toast.message, code),
                None => eprintln!("[{:?}] {}", toast.kind, toast.message),
            }
        }
    }
}

/// 第一页直接查询，其余页通过翻页触发，保证只发起一次请求
async fn load_page<T, P>(table: &TableState<T, P>, page: u32)
where
    T: Clone + Send + 'static,
    P: adconsole_client::MergeParams + Clone + Send + 'static,
{
    if page > 1 {
        table.set_page(page).await;
    } else {
        table.fetch().await;
    }
}

fn print_footer(total: u64, page: u32, total_pages: u64) {
    println!("{}", "-".repeat(40));
    println!("共 {} 条，第 {}/{} 页", total, page, total_pages.max(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use adconsole_client::SessionState;
    use adconsole_shared::storage::MemoryStorage;

    /// 开发模式，后端地址不可达
    fn mock_runner(storage: &MemoryStorage) -> CommandRunner {
        let mut config = AppConfig::default();
        config.api.base_url = "http://127.0.0.1:9/api/v1".to_string();
        config.api.timeout_seconds = 2;
        config.api.enable_mock = true;
        CommandRunner::new(config, Arc::new(storage.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_login_validation_blocks_request() {
        let storage = MemoryStorage::new();
        let runner = mock_runner(&storage);

        let err = runner.run_login("ad", "123").await.unwrap_err();
        assert_eq!(err.to_string(), "登录信息校验未通过");
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_login_then_session_is_shared_across_runners() {
        let storage = MemoryStorage::new();
        let runner = mock_runner(&storage);
        runner.run_login("admin", "admin123").await.unwrap();
        assert_eq!(runner.session().state(), SessionState::Authenticated);

        // 新进程从同一存储恢复令牌
        let runner = mock_runner(&storage);
        assert!(runner.session().is_logged_in());
        runner.run_whoami().await.unwrap();
        assert_eq!(runner.session().nickname(), "管理员");
    }

    #[tokio::test]
    async fn test_list_commands_require_login() {
        let storage = MemoryStorage::new();
        let runner = mock_runner(&storage);

        let err = runner
            .run_advertisers(AdvertiserFilter::default(), 1, 20)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/login?redirect=%2Fadvertisers"));

        let err = runner.run_whoami().await.unwrap_err();
        assert!(err.to_string().starts_with("未登录或登录已过期"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_reported() {
        let storage = MemoryStorage::new();
        let mut runner = mock_runner(&storage);

        let result = runner
            .run(Commands::Login {
                username: "admin".into(),
                password: "wrong-password".into(),
            })
            .await;
        assert!(result.is_err());
        // 通知已在 run 结束时输出并清空
        assert!(runner.toasts.try_recv().is_err());
    }

    #[test]
    fn test_theme_persists_across_runners() {
        let storage = MemoryStorage::new();
        let runner = mock_runner(&storage);
        runner.run_theme(Some(ThemeMode::Dark), false, false);
        assert_eq!(runner.settings().theme_mode(), ThemeMode::Dark);

        let runner = mock_runner(&storage);
        assert_eq!(runner.settings().theme_mode(), ThemeMode::Dark);
        runner.run_theme(None, true, false);
        assert_eq!(runner.settings().theme_mode(), ThemeMode::System);
        assert!(!runner.settings().is_dark());
    }
}
