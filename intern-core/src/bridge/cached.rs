//! 带记忆化的调用桥

use super::error::InvocationFailure;
use super::invoker::InvocationBridge;
use super::value::{write_list, Value};
use crate::cache::{CacheError, CacheStats, MemoizingCache};
use intern_log::Logger;
use std::fmt;
use std::sync::Arc;

/// 缓存键：目标 + 参数
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    pub target: String,
    pub arguments: Vec<Value>,
}

impl CallKey {
    pub fn new(target: &str, arguments: &[Value]) -> Self {
        CallKey {
            target: target.to_string(),
            arguments: arguments.to_vec(),
        }
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.target)?;
        write_list(f, &self.arguments)?;
        f.write_str(")")
    }
}

/// 对 [`InvocationBridge`] 的调用做记忆化
///
/// 相同的 `(target, args)` 只真正调用一次；失败不会被缓存。
/// 被注册的可调用对象应当是纯函数。
pub struct CachedInvoker {
    bridge: Arc<InvocationBridge>,
    cache: MemoizingCache<CallKey, Value, InvocationFailure>,
}

impl CachedInvoker {
    pub fn new(bridge: Arc<InvocationBridge>) -> Self {
        Self::with_logger(bridge, Logger::noop())
    }

    pub fn with_logger(bridge: Arc<InvocationBridge>, logger: Arc<Logger>) -> Self {
        CachedInvoker {
            bridge,
            cache: MemoizingCache::with_logger(logger),
        }
    }

    pub fn invoke(&self, target: &str, args: &[Value]) -> Result<Value, CacheError<InvocationFailure>> {
        self.cache
            .get(CallKey::new(target, args), || self.bridge.invoke(target, args))
    }

    /// 已缓存的结果（不触发调用）
    pub fn cached(&self, target: &str, args: &[Value]) -> Option<Value> {
        self.cache.peek(&CallKey::new(target, args))
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn bridge(&self) -> &Arc<InvocationBridge> {
        &self.bridge
    }
}

impl fmt::Debug for CachedInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedInvoker")
            .field("bridge", &self.bridge)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{Arity, InvocationCause};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_bridge(calls: Arc<AtomicUsize>) -> Arc<InvocationBridge> {
        let bridge = InvocationBridge::new();
        bridge
            .register("double", Arity::Exact(1), move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                let n = args[0].as_int().ok_or("double expects an integer")?;
                Ok(Value::Int(n * 2))
            })
            .unwrap();
        Arc::new(bridge)
    }

    #[test]
    fn test_repeated_call_hits_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let invoker = CachedInvoker::new(counting_bridge(Arc::clone(&calls)));

        assert_eq!(invoker.invoke("double", &[Value::Int(4)]).unwrap(), Value::Int(8));
        assert_eq!(invoker.invoke("double", &[Value::Int(4)]).unwrap(), Value::Int(8));
        assert_eq!(invoker.invoke("double", &[Value::Int(5)]).unwrap(), Value::Int(10));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(invoker.cached("double", &[Value::Int(4)]), Some(Value::Int(8)));

        let stats = invoker.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 2, 2));
    }

    #[test]
    fn test_failure_passes_through_and_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let invoker = CachedInvoker::new(counting_bridge(Arc::clone(&calls)));

        for _ in 0..2 {
            let err = invoker.invoke("double", &[Value::Str("x".into())]).unwrap_err();
            let failure = err.failure().unwrap();
            assert!(matches!(failure.cause, InvocationCause::Raised(_)));
            assert_eq!(failure.arguments, vec![Value::Str("x".into())]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(invoker.stats().failures, 2);
    }

    #[test]
    fn test_call_key_display() {
        let key = CallKey::new("add", &[Value::Int(1), Value::Int(2)]);
        assert_eq!(key.to_string(), "add(1, 2)");
    }
}
