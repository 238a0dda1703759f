//! 缓存错误类型

use std::fmt;
use std::sync::Arc;

/// 一次 `get` 的失败结果
///
/// 失败值由计算者与所有等待者共享，所以用 `Arc` 包装。
pub enum CacheError<E> {
    /// 计算返回了错误（不会被缓存，之后的调用会重新计算）
    Failed(Arc<E>),
    /// 计算在完成前被中断（panic 展开）
    Interrupted,
}

impl<E> CacheError<E> {
    /// 计算错误本身
    pub fn failure(&self) -> Option<&E> {
        match self {
            CacheError::Failed(err) => Some(err),
            CacheError::Interrupted => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, CacheError::Interrupted)
    }
}

// 手写 Clone：不要求 E: Clone
impl<E> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        match self {
            CacheError::Failed(err) => CacheError::Failed(Arc::clone(err)),
            CacheError::Interrupted => CacheError::Interrupted,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for CacheError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
            CacheError::Interrupted => f.write_str("Interrupted"),
        }
    }
}

impl<E: fmt::Display> fmt::Display for CacheError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Failed(err) => write!(f, "computation failed: {err}"),
            CacheError::Interrupted => f.write_str("computation was interrupted before completing"),
        }
    }
}

impl<E> std::error::Error for CacheError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Failed(err) => Some(err.as_ref()),
            CacheError::Interrupted => None,
        }
    }
}
