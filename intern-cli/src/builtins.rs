//! 内置可调用对象
//!
//! 全部是纯函数，可以安全地被记忆化。算术使用 checked 运算，溢出作为错误返回。

use intern_core::bridge::{Arity, BoxError, BridgeError, InvocationBridge, Value};

fn int_arg(name: &str, value: &Value) -> Result<i64, BoxError> {
    value
        .as_int()
        .ok_or_else(|| format!("{name} expects integers, got {}", value.type_name()).into())
}

fn add(args: &[Value]) -> Result<Value, BoxError> {
    let mut total = 0i64;
    for arg in args {
        total = total
            .checked_add(int_arg("add", arg)?)
            .ok_or("add overflowed")?;
    }
    Ok(Value::Int(total))
}

fn mul(args: &[Value]) -> Result<Value, BoxError> {
    let mut product = 1i64;
    for arg in args {
        product = product
            .checked_mul(int_arg("mul", arg)?)
            .ok_or("mul overflowed")?;
    }
    Ok(Value::Int(product))
}

fn concat(args: &[Value]) -> Result<Value, BoxError> {
    let mut text = String::new();
    for arg in args {
        match arg {
            Value::Str(s) => text.push_str(s),
            other => text.push_str(&other.to_string()),
        }
    }
    Ok(Value::Str(text))
}

fn fib(args: &[Value]) -> Result<Value, BoxError> {
    let n = int_arg("fib", &args[0])?;
    if n < 0 {
        return Err(format!("fib is undefined for negative input {n}").into());
    }
    if n == 0 {
        return Ok(Value::Int(0));
    }
    let (mut a, mut b) = (0i64, 1i64);
    for _ in 1..n {
        let next = a.checked_add(b).ok_or_else(|| format!("fib({n}) overflows"))?;
        a = b;
        b = next;
    }
    Ok(Value::Int(b))
}

fn len(args: &[Value]) -> Result<Value, BoxError> {
    let count = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        other => return Err(format!("len expects a string or list, got {}", other.type_name()).into()),
    };
    Ok(Value::Int(i64::try_from(count)?))
}

fn fail(args: &[Value]) -> Result<Value, BoxError> {
    let reason = Value::List(args.to_vec());
    Err(format!("fail called with {reason}").into())
}

/// 注册全部内置函数
pub fn register_builtins(bridge: &InvocationBridge) -> Result<(), BridgeError> {
    bridge.register("add", Arity::Variadic, add)?;
    bridge.register("mul", Arity::Variadic, mul)?;
    bridge.register("concat", Arity::Variadic, concat)?;
    bridge.register("fib", Arity::Exact(1), fib)?;
    bridge.register("len", Arity::Exact(1), len)?;
    bridge.register("fail", Arity::Variadic, fail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intern_core::bridge::InvocationCause;

    fn bridge() -> InvocationBridge {
        let bridge = InvocationBridge::new();
        register_builtins(&bridge).unwrap();
        bridge
    }

    #[test]
    fn test_arithmetic() {
        let bridge = bridge();
        let ints = [Value::Int(2), Value::Int(3), Value::Int(4)];
        assert_eq!(bridge.invoke("add", &ints).unwrap(), Value::Int(9));
        assert_eq!(bridge.invoke("mul", &ints).unwrap(), Value::Int(24));
        assert_eq!(bridge.invoke("add", &[]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let failure = bridge()
            .invoke("mul", &[Value::Int(i64::MAX), Value::Int(2)])
            .unwrap_err();
        assert!(matches!(failure.cause, InvocationCause::Raised(_)));
        assert!(failure.to_string().contains("mul overflowed"));
    }

    #[test]
    fn test_fib() {
        let bridge = bridge();
        assert_eq!(bridge.invoke("fib", &[Value::Int(0)]).unwrap(), Value::Int(0));
        assert_eq!(bridge.invoke("fib", &[Value::Int(30)]).unwrap(), Value::Int(832_040));
        assert!(bridge.invoke("fib", &[Value::Int(-1)]).is_err());
        assert_eq!(
            bridge.invoke("fib", &[Value::Int(92)]).unwrap(),
            Value::Int(7_540_113_804_746_346_429)
        );
        assert!(bridge.invoke("fib", &[Value::Int(93)]).is_err());
    }

    #[test]
    fn test_concat_and_len() {
        let bridge = bridge();
        let joined = bridge
            .invoke("concat", &[Value::Str("n=".into()), Value::Int(3)])
            .unwrap();
        assert_eq!(joined, Value::Str("n=3".into()));
        assert_eq!(
            bridge.invoke("len", &[Value::Str("héllo".into())]).unwrap(),
            Value::Int(5)
        );
        assert!(bridge.invoke("len", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_fail_always_raises() {
        let failure = bridge().invoke("fail", &[Value::Int(1), Value::Int(2)]).unwrap_err();
        assert_eq!(failure.arguments, vec![Value::Int(1), Value::Int(2)]);
        assert!(failure.to_string().ends_with("fail called with [1, 2]"));
    }
}
