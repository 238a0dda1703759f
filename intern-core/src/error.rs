//! 统一错误类型
//!
//! 各组件有自己的错误枚举，这里把它们汇总成一个类型，并给出错误类别，
//! 由 [`Terminal::report`](crate::terminal::Terminal::report) 统一呈现为一行错误输出。

use crate::bridge::{BridgeError, InvocationFailure};
use crate::cache::CacheError;
use crate::kit::lexer::TokenizerError;
use crate::terminal::TerminalError;
use intern_config::ConfigError;

/// Intern 错误类型
#[derive(Debug, thiserror::Error)]
pub enum InternError {
    #[error("{0}")]
    Terminal(#[from] TerminalError),

    #[error("{0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("{0}")]
    Invocation(#[from] InvocationFailure),

    /// 经过缓存的调用失败（包括被中断的计算）
    #[error("{0}")]
    Cached(#[from] CacheError<InvocationFailure>),

    #[error("{0}")]
    Bridge(#[from] BridgeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] intern_log::Error),

    /// 调用方的用法错误（例如命令参数不合法）
    #[error("{0}")]
    Usage(String),
}

impl InternError {
    /// 错误类别
    ///
    /// `"input"`、`"timeout"`、`"invocation"`、`"configuration"`、`"programmer"`、`"io"` 之一。
    pub fn category(&self) -> &'static str {
        match self {
            InternError::Terminal(TerminalError::Configuration { .. }) => "configuration",
            InternError::Terminal(TerminalError::ReadTimeout { .. }) => "timeout",
            InternError::Terminal(TerminalError::Io(_)) => "io",
            InternError::Tokenizer(err) if err.is_input_error() => "input",
            InternError::Tokenizer(_) => "programmer",
            InternError::Invocation(_) | InternError::Cached(_) => "invocation",
            InternError::Bridge(_) => "programmer",
            InternError::Config(_) | InternError::Logging(_) => "configuration",
            InternError::Usage(_) => "input",
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        InternError::Usage(message.into())
    }
}

/// Intern 结果类型
pub type Result<T> = std::result::Result<T, InternError>;
