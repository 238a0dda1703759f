//! Intern Core - 终端会话、组合式词法分析、记忆化缓存、调用桥
//!
//! 库组件从不直接打印：失败以类型化错误返回，日志通过构造时注入的
//! `intern_log::Logger` 输出，面向用户的呈现统一交给 [`terminal::Terminal`]。
//!
//! ```text
//! Terminal ──line──> Tokenizer ──tokens──> CachedInvoker ──> InvocationBridge
//!                                               │
//!                                         MemoizingCache
//! ```

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod kit;
pub mod terminal;

pub use bridge::{
    Arity, BoxError, BridgeError, CachedInvoker, CallKey, InvocationBridge, InvocationCause,
    InvocationFailure, Value,
};
pub use cache::{CacheError, CacheStats, MemoizingCache};
pub use config::{level_of, ComponentLoggers};
pub use error::{InternError, Result};
pub use kit::lexer::{PatternModule, Token, TokenKind, TokenModule, Tokenizer, TokenizerError};
pub use terminal::{ExitStatus, OutputMode, Prefix, ReadOutcome, Terminal, TerminalError};

// Re-export config types from intern-config
pub use intern_config::{Component, InternConfig, LoggingConfig, TerminalConfig};
