//! 记忆化缓存

mod error;
mod memo;

pub use error::CacheError;
pub use memo::{CacheStats, MemoizingCache};
