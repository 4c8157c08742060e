//! 统一可观测性模块
//!
//! 提供日志与指标的统一初始化。客户端进程不暴露指标端口，
//! 指标通过 metrics 门面记录，由宿主进程决定安装哪个 recorder。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

use crate::config::ObservabilityConfig;

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. 指标描述注册
///
/// # Example
///
/// ```ignore
/// use adconsole_shared::config::AppConfig;
/// use adconsole_shared::observability;
///
/// let config = AppConfig::load()?;
/// observability::init("adconsole-cli", &config.observability)?;
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;
    metrics::describe();

    info!(
        service = %service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
