//! 日志基础设施

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::LoggingConfig;

pub struct Logger;

impl Logger {
    /// 初始化日志系统
    ///
    /// `RUST_LOG` 存在时优先于配置中的级别。配置了 `log_dir` 时额外写入按日期分割的
    /// 日志文件，返回的 guard 必须在进程存活期间持有，否则缓冲中的日志会丢失。
    pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "product_catalog={level},tower_http={level}",
                level = config.level
            ))
        });

        let console_layer = config
            .console_output
            .then(|| fmt::layer().with_writer(io::stdout).with_ansi(true));

        let (file_layer, guard) = match &config.log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let (writer, guard) = non_blocking(rolling::daily(dir, &config.file_prefix));
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_names(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }
}
