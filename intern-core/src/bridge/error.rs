//! 桥接错误类型
//!
//! 无论失败发生在解析阶段（找不到目标、参数个数不符）、被调用方返回错误，
//! 还是被调用方 panic，调用方看到的都是同一种形状：[`InvocationFailure`]。

use super::value::{write_list, Value};
use super::Arity;
use std::fmt;

/// 被调用方返回的错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 注册阶段的错误
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("callable name must not be empty")]
    EmptyName,

    #[error("callable '{name}' is already registered")]
    Duplicate { name: String },
}

/// 失败原因
#[derive(Debug, thiserror::Error)]
pub enum InvocationCause {
    /// 没有以该名称注册的可调用对象
    #[error("no callable named '{0}' is registered")]
    NotFound(String),

    /// 参数个数不符
    #[error("expected {expected} argument(s), found {found}")]
    ArityMismatch { expected: Arity, found: usize },

    /// 被调用方返回了错误
    #[error("{0}")]
    Raised(BoxError),

    /// 被调用方 panic
    #[error("callable panicked: {0}")]
    Panicked(String),
}

/// 一次调用的统一失败
///
/// 总是带着目标描述、参数列表和原因。`source()` 返回原始原因。
#[derive(Debug)]
pub struct InvocationFailure {
    pub target: String,
    pub arguments: Vec<Value>,
    pub cause: InvocationCause,
}

impl InvocationFailure {
    pub fn new(target: impl Into<String>, arguments: &[Value], cause: InvocationCause) -> Self {
        InvocationFailure {
            target: target.into(),
            arguments: arguments.to_vec(),
            cause,
        }
    }

    /// 解析阶段的失败（目标不存在或参数个数不符）
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self.cause,
            InvocationCause::NotFound(_) | InvocationCause::ArityMismatch { .. }
        )
    }
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call {}(", self.target)?;
        write_list(f, &self.arguments)?;
        write!(f, ") failed: {}", self.cause)
    }
}

impl std::error::Error for InvocationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            InvocationCause::Raised(err) => Some(&**err),
            cause => Some(cause),
        }
    }
}
