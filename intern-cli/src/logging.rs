//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber`，只输出到 stderr，stdout 留给终端协议。
//! 设置了 `RUST_LOG` 时以它为准。

use intern_config::{LogFormat, LogLevel, LoggingConfig};
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// CLI 自身事件的 target
pub const TARGET: &str = "intern::cli";

/// 配置级别转换为 tracing 级别
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

/// 按配置初始化全局 subscriber
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let layer = create_format_layer(config.format, io::stderr);
    match EnvFilter::try_from_default_env() {
        Ok(env) => tracing_subscriber::registry().with(layer).with(env).try_init(),
        Err(_) => {
            let targets = Targets::new()
                .with_default(level_filter(config.level))
                .with_target(TARGET, level_filter(config.level));
            tracing_subscriber::registry()
                .with(layer.with_filter(targets))
                .try_init()
        }
    }
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
