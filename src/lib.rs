//! Intern - 并发工具库
//!
//! 一组可以单独使用、也可以组合使用的组件：
//!
//! ```text
//! intern-sync/    - ScopedLock（守卫式作用域锁）
//! intern-log/     - 显式传递的结构化日志
//! intern-config/  - JSON 配置
//! intern-core/    - Terminal、Tokenizer、MemoizingCache、InvocationBridge
//! ```
//!
//! # Quick Start
//!
//! ```
//! use intern::{Arity, Intern, InternConfig, PatternModule, Value};
//!
//! let intern = Intern::silent();
//!
//! let tokenizer = intern.tokenizer();
//! tokenizer.register(&PatternModule::new("word", "[a-z]+")).unwrap();
//! assert_eq!(tokenizer.tokenize("abc").unwrap().len(), 1);
//!
//! let bridge = intern.bridge();
//! bridge
//!     .register("neg", Arity::Exact(1), |args| Ok(Value::Int(-args[0].as_int().unwrap_or(0))))
//!     .unwrap();
//! assert_eq!(bridge.invoke("neg", &[Value::Int(2)]).unwrap(), Value::Int(-2));
//! # let _ = InternConfig::default();
//! ```

use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;

// 组件模块
pub use intern_core::{bridge, cache, kit, terminal};

// 重导出常用类型
pub use intern_config::{
    Component, ConfigError, InternConfig, LogFormat, LogLevel, LoggingConfig, OutputMode,
    TerminalConfig, DEFAULT_CONFIG_FILE,
};
pub use intern_core::{
    Arity, BoxError, BridgeError, CacheError, CacheStats, CachedInvoker, CallKey,
    ComponentLoggers, ExitStatus, InternError, InvocationBridge, InvocationCause,
    InvocationFailure, MemoizingCache, PatternModule, Prefix, ReadOutcome, Result, Terminal,
    TerminalError, Token, TokenKind, TokenModule, Tokenizer, TokenizerError, Value,
};
pub use intern_log::{Level, LogRingBuffer, Logger};
pub use intern_sync::{Condition, ScopedGuard, ScopedLock};

/// 组件工厂
///
/// 持有各组件的 logger，构造出的组件自动接入对应的日志级别。
#[derive(Debug, Clone)]
pub struct Intern {
    loggers: ComponentLoggers,
}

impl Intern {
    /// 按日志配置初始化（stderr / 文件 / 环形缓冲区）
    pub fn init(config: &InternConfig) -> Result<Self> {
        config.validate()?;
        Ok(Intern {
            loggers: ComponentLoggers::from_config(&config.logging)?,
        })
    }

    /// 读取配置文件后初始化
    pub fn from_file(path: impl AsRef<Path>) -> Result<(Self, InternConfig)> {
        let config = InternConfig::load(path)?;
        Ok((Self::init(&config)?, config))
    }

    /// 使用给定的 logger
    pub fn with_loggers(loggers: ComponentLoggers) -> Self {
        Intern { loggers }
    }

    /// 不输出任何日志
    pub fn silent() -> Self {
        Intern {
            loggers: ComponentLoggers::silent(),
        }
    }

    pub fn loggers(&self) -> &ComponentLoggers {
        &self.loggers
    }

    /// 崩溃转储用的环形缓冲区
    pub fn ring_buffer(&self) -> Option<&Arc<LogRingBuffer>> {
        self.loggers.ring.as_ref()
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::with_logger(Arc::clone(&self.loggers.tokenizer))
    }

    pub fn cache<K, R, E>(&self) -> MemoizingCache<K, R, E>
    where
        K: Eq + Hash + Clone + std::fmt::Debug,
        R: Clone,
    {
        MemoizingCache::with_logger(Arc::clone(&self.loggers.cache))
    }

    pub fn bridge(&self) -> InvocationBridge {
        InvocationBridge::with_logger(Arc::clone(&self.loggers.bridge))
    }

    pub fn cached_invoker(&self, bridge: Arc<InvocationBridge>) -> CachedInvoker {
        CachedInvoker::with_logger(bridge, Arc::clone(&self.loggers.cache))
    }

    /// 使用进程标准流的终端
    pub fn stdio_terminal(&self, config: &TerminalConfig) -> Result<Terminal> {
        Ok(Terminal::stdio_with_logger(
            config,
            Arc::clone(&self.loggers.terminal),
        )?)
    }

    /// 终端构造器（已接入终端 logger）
    pub fn terminal_builder(&self) -> terminal::TerminalBuilder {
        Terminal::builder().logger(Arc::clone(&self.loggers.terminal))
    }
}
