//! 基于文件存储的跨进程会话

use adconsole_cli::cli::{CommandRunner, Commands};
use adconsole_client::{SessionState, ThemeMode};
use adconsole_shared::config::AppConfig;
use adconsole_shared::storage;

fn config_with_file(path: std::path::PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = "http://127.0.0.1:9/api/v1".to_string();
    config.api.timeout_seconds = 2;
    config.api.enable_mock = true;
    config.storage.path = Some(path);
    config
}

fn runner(config: &AppConfig) -> CommandRunner {
    let storage = storage::open(&config.storage).unwrap();
    CommandRunner::new(config.clone(), storage).unwrap()
}

#[tokio::test]
async fn login_survives_restart_and_logout_clears_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_file(dir.path().join("session.json"));

    let mut first = runner(&config);
    first
        .run(Commands::Login {
            username: "admin".into(),
            password: "admin123".into(),
        })
        .await
        .unwrap();
    first
        .run(Commands::Theme {
            set: Some(ThemeMode::Light),
            toggle: false,
            system_dark: true,
        })
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(raw.contains("mock_access_token_"));
    assert!(raw.contains("oceanengine_theme-mode"));

    let mut second = runner(&config);
    assert!(second.session().is_logged_in());
    second.run(Commands::Whoami).await.unwrap();
    second.run(Commands::Logout).await.unwrap();
    assert_eq!(second.session().state(), SessionState::Anonymous);

    // 登出只清除会话，不影响设置
    let third = runner(&config);
    assert!(!third.session().is_logged_in());
    assert_eq!(third.settings().theme_mode(), ThemeMode::Light);
}

#[tokio::test]
async fn route_command_reflects_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_file(dir.path().join("session.json"));

    let mut runner = runner(&config);
    runner
        .run(Commands::Route {
            path: "/campaigns?status=enable".into(),
            require: vec![],
        })
        .await
        .unwrap();

    let err = runner
        .run(Commands::Campaigns {
            advertiser_id: None,
            status: None,
            name: None,
            page: 1,
            page_size: 20,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("请先执行 login"));
}
