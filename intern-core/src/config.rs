//! 日志配置到组件 logger 的映射
//!
//! 每个组件一个独立级别的 logger，全部转发到同一个根 logger，
//! 根 logger 负责实际输出（stderr / 文件 / 环形缓冲区）。

use intern_config::{Component, LogLevel, LoggingConfig};
use intern_log::{Level, LogConfig, LogRingBuffer, Logger};
use std::sync::Arc;

/// 配置级别转换为日志级别
pub fn level_of(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::Trace,
        LogLevel::Debug => Level::Debug,
        LogLevel::Info => Level::Info,
        LogLevel::Warn => Level::Warn,
        LogLevel::Error => Level::Error,
    }
}

/// 各组件的 logger
#[derive(Debug, Clone)]
pub struct ComponentLoggers {
    pub terminal: Arc<Logger>,
    pub tokenizer: Arc<Logger>,
    pub cache: Arc<Logger>,
    pub bridge: Arc<Logger>,
    /// 崩溃转储用的环形缓冲区
    pub ring: Option<Arc<LogRingBuffer>>,
}

impl ComponentLoggers {
    /// 按配置初始化：输出到 stderr，可选文件与环形缓冲区
    ///
    /// 日志文件打不开时返回错误。
    pub fn from_config(config: &LoggingConfig) -> Result<Self, intern_log::Error> {
        let mut log_config = LogConfig::new(level_of(config.most_verbose())).with_stderr();
        if let Some(path) = &config.file {
            log_config = log_config.with_file(path.clone());
        }
        if config.ring_buffer > 0 {
            log_config = log_config.with_ring_buffer(config.ring_buffer);
        }
        let (root, ring) = log_config.try_init()?;
        Ok(Self::attach(root, ring, config))
    }

    /// 在已有的根 logger 上按组件级别派生
    pub fn attach(
        root: Arc<Logger>,
        ring: Option<Arc<LogRingBuffer>>,
        config: &LoggingConfig,
    ) -> Self {
        let derive = |component: Component| {
            Logger::new(level_of(config.level_for(component))).with_sink(Arc::clone(&root))
        };
        ComponentLoggers {
            terminal: derive(Component::Terminal),
            tokenizer: derive(Component::Tokenizer),
            cache: derive(Component::Cache),
            bridge: derive(Component::Bridge),
            ring,
        }
    }

    /// 全部静默
    pub fn silent() -> Self {
        let noop = Logger::noop();
        ComponentLoggers {
            terminal: Arc::clone(&noop),
            tokenizer: Arc::clone(&noop),
            cache: Arc::clone(&noop),
            bridge: noop,
            ring: None,
        }
    }

    pub fn get(&self, component: Component) -> &Arc<Logger> {
        match component {
            Component::Terminal => &self.terminal,
            Component::Tokenizer => &self.tokenizer,
            Component::Cache => &self.cache,
            Component::Bridge => &self.bridge,
        }
    }
}
