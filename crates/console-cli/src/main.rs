//! 控制台 CLI 入口

use adconsole_cli::cli::{Cli, CommandRunner};
use adconsole_shared::config::AppConfig;
use adconsole_shared::{observability, storage};
use anyhow::Context;
use clap::Parser;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("加载配置失败")?;
    cli.apply(&mut config);

    observability::init("adconsole-cli", &config.observability)?;

    if config.storage.path.is_none() {
        warn!("未配置存储文件，登录状态不会在多次调用之间保留");
    }
    let storage = storage::open(&config.storage).context("打开本地存储失败")?;

    let mut runner = CommandRunner::new(config, storage)?;
    runner.run(cli.command).await
}
