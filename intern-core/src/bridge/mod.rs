//! 调用桥
//!
//! 把形形色色的调用失败统一成一种形状：[`InvocationFailure`]。

mod cached;
mod error;
mod invoker;
mod value;

pub use cached::{CachedInvoker, CallKey};
pub use error::{BoxError, BridgeError, InvocationCause, InvocationFailure};
pub use invoker::{Arity, InvocationBridge, NativeFn};
pub use value::Value;
