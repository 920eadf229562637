use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// 构建日志过滤器：优先 RUST_LOG，其次配置的级别
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.level.to_lowercase())
        .with_context(|| format!("无效的日志级别：{}", config.level))
}

/// 进程级日志初始化，只能在启动时调用一次
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let console = config
        .console
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(true));

    let file = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("创建日志目录失败：{}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("打开日志文件失败：{}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("日志系统已经初始化过")?;

    Ok(())
}
