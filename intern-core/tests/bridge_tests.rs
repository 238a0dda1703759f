//! 调用桥集成测试

use intern_core::bridge::{
    Arity, BoxError, CachedInvoker, InvocationBridge, InvocationCause, InvocationFailure, Value,
};
use intern_core::{CacheError, InternError};
use intern_log::{Level, LogRingBuffer, Logger};
use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("overflow while computing {0}")]
struct Overflow(String);

fn checked_mul(args: &[Value]) -> Result<Value, BoxError> {
    let mut product = 1i64;
    for arg in args {
        let n = arg
            .as_int()
            .ok_or_else(|| format!("mul expects integers, got {}", arg.type_name()))?;
        product = product
            .checked_mul(n)
            .ok_or_else(|| Overflow("mul".to_string()))?;
    }
    Ok(Value::Int(product))
}

#[test]
fn test_failure_carries_cause_and_arguments() {
    let bridge = InvocationBridge::new();
    bridge.register("mul", Arity::Variadic, checked_mul).unwrap();

    let args = [Value::Int(i64::MAX), Value::Int(2)];
    let failure: InvocationFailure = bridge.invoke("mul", &args).unwrap_err();

    assert_eq!(failure.target, "mul");
    assert_eq!(failure.arguments, vec![Value::Int(i64::MAX), Value::Int(2)]);
    let source = failure.source().unwrap();
    assert!(source.downcast_ref::<Overflow>().is_some());
    assert_eq!(
        failure.to_string(),
        format!("call mul({}, 2) failed: overflow while computing mul", i64::MAX)
    );
}

#[test]
fn test_every_failure_shape_is_uniform() {
    let bridge = InvocationBridge::new();
    bridge.register("mul", Arity::Exact(2), checked_mul).unwrap();
    bridge
        .register("broken", Arity::Exact(1), |args| {
            let list = args[0].as_list().unwrap_or(&[]);
            Ok(list[3].clone())
        })
        .unwrap();

    let cases = [
        ("nope", vec![Value::Int(1), Value::Int(2)]),
        ("mul", vec![Value::Int(1)]),
        ("mul", vec![Value::Int(1), Value::Str("x".into())]),
        ("broken", vec![Value::List(vec![])]),
    ];
    let causes: Vec<&'static str> = cases
        .iter()
        .map(|(target, args)| {
            let failure = bridge.invoke(target, args).unwrap_err();
            assert_eq!(&failure.target, target);
            assert_eq!(&failure.arguments, args);
            match failure.cause {
                InvocationCause::NotFound(_) => "not-found",
                InvocationCause::ArityMismatch { .. } => "arity",
                InvocationCause::Raised(_) => "raised",
                InvocationCause::Panicked(_) => "panicked",
            }
        })
        .collect();
    assert_eq!(causes, vec!["not-found", "arity", "raised", "panicked"]);
}

#[test]
fn test_cached_invoker_memoizes_and_reports() {
    let calls = Arc::new(AtomicUsize::new(0));
    let bridge = InvocationBridge::new();
    {
        let calls = Arc::clone(&calls);
        bridge
            .register("square", Arity::Exact(1), move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                let n = args[0].as_int().ok_or("square expects an integer")?;
                Ok(Value::Int(n * n))
            })
            .unwrap();
    }

    let ring = LogRingBuffer::new(64);
    let logger = Logger::new(Level::Debug).with_sink(Arc::clone(&ring));
    let invoker = CachedInvoker::with_logger(Arc::new(bridge), logger);

    for _ in 0..3 {
        assert_eq!(invoker.invoke("square", &[Value::Int(9)]).unwrap(), Value::Int(81));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(ring
        .dump_records()
        .iter()
        .any(|r| r.message.contains("Cache miss")));

    let err = invoker.invoke("square", &[Value::Unit]).unwrap_err();
    assert!(matches!(err, CacheError::Failed(_)));
    let unified = InternError::from(err);
    assert_eq!(unified.category(), "invocation");
    assert!(unified.to_string().contains("square expects an integer"));
}
