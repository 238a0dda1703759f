//! 调用桥
//!
//! 按名称注册可调用对象（固定参数个数或变参），统一调用入口。
//! 调用在注册表锁之外执行，可调用对象之间互不阻塞。

use super::error::{BoxError, BridgeError, InvocationCause, InvocationFailure};
use super::value::Value;
use intern_log::{debug, trace, warn, Logger};
use intern_sync::ScopedLock;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// 可调用对象的签名
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync;

/// 参数个数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => *n == count,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Variadic => f.write_str("any number of"),
        }
    }
}

struct Callable {
    arity: Arity,
    func: Box<NativeFn>,
}

/// 调用桥
pub struct InvocationBridge {
    callables: ScopedLock<BTreeMap<String, Arc<Callable>>>,
    logger: Arc<Logger>,
}

impl InvocationBridge {
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        InvocationBridge {
            callables: ScopedLock::new(BTreeMap::new()),
            logger,
        }
    }

    /// 注册可调用对象
    pub fn register<F>(&self, name: &str, arity: Arity, func: F) -> Result<(), BridgeError>
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(BridgeError::EmptyName);
        }
        let mut callables = self.callables.acquire();
        if callables.contains_key(name) {
            return Err(BridgeError::Duplicate {
                name: name.to_string(),
            });
        }
        callables.insert(
            name.to_string(),
            Arc::new(Callable {
                arity,
                func: Box::new(func),
            }),
        );
        debug!(self.logger, "Registered callable '{}' (arity {})", name, arity);
        Ok(())
    }

    /// 调用 `target`
    ///
    /// 解析失败、被调用方返回错误、被调用方 panic，都会变成一个
    /// 携带目标、参数和原因的 [`InvocationFailure`]。
    pub fn invoke(&self, target: &str, args: &[Value]) -> Result<Value, InvocationFailure> {
        let fail = |cause: InvocationCause| {
            debug!(self.logger, "Invocation of '{}' failed: {}", target, cause);
            InvocationFailure::new(target, args, cause)
        };

        let callable = self.callables.acquire().get(target).cloned();
        let callable = match callable {
            Some(callable) => callable,
            None => return Err(fail(InvocationCause::NotFound(target.to_string()))),
        };
        if !callable.arity.accepts(args.len()) {
            return Err(fail(InvocationCause::ArityMismatch {
                expected: callable.arity,
                found: args.len(),
            }));
        }

        trace!(self.logger, "Invoking '{}' with {} argument(s)", target, args.len());
        match panic::catch_unwind(AssertUnwindSafe(|| (callable.func)(args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(fail(InvocationCause::Raised(err))),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(self.logger, "Callable '{}' panicked: {}", target, message);
                Err(fail(InvocationCause::Panicked(message)))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.acquire().contains_key(name)
    }

    /// 已注册名称（字典序）
    pub fn names(&self) -> Vec<String> {
        self.callables.acquire().keys().cloned().collect()
    }

    pub fn arity_of(&self, name: &str) -> Option<Arity> {
        self.callables.acquire().get(name).map(|c| c.arity)
    }

    pub fn len(&self) -> usize {
        self.callables.acquire().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InvocationBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InvocationBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationBridge")
            .field("callables", &self.names())
            .finish()
    }
}

/// 从 panic 载荷中取出消息
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
