//! intern-sync - 作用域锁
//!
//! 为 intern 各个 crate 提供统一的加锁方式：
//! - **守卫释放**：`acquire()` 返回守卫，离开作用域（正常返回、提前返回、`?`、panic）时自动释放
//! - **不可重复释放**：`release(self)` 消耗守卫，第二次释放在类型层面无法写出
//! - **条件等待**：守卫可以在 [`Condition`] 上挂起，唤醒后重新持有锁
//!
//! # 快速开始
//!
//! ```
//! use intern_sync::ScopedLock;
//!
//! let lock = ScopedLock::new(Vec::new());
//! {
//!     let mut items = lock.acquire();
//!     items.push(1);
//! } // 此处自动释放
//! assert_eq!(lock.acquire().len(), 1);
//! ```
//!
//! # 重入
//!
//! 同一线程在持有守卫时再次 `acquire()` 会死锁。不支持重入是有意为之，不是缺陷。

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;

/// 作用域锁
///
/// 持有者 panic 导致的中毒状态不会向调用方暴露：被保护的数据在每个等待点都保持一致，
/// 因此直接取回内部数据继续使用。
pub struct ScopedLock<T> {
    inner: Mutex<T>,
}

/// 锁守卫，Drop 时释放
pub struct ScopedGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

/// 条件变量，配合 [`ScopedGuard::wait`] 使用
#[derive(Default)]
pub struct Condition {
    inner: Condvar,
}

impl<T> ScopedLock<T> {
    /// 创建新的作用域锁
    pub const fn new(value: T) -> Self {
        ScopedLock {
            inner: Mutex::new(value),
        }
    }

    /// 获取锁（阻塞）
    pub fn acquire(&self) -> ScopedGuard<'_, T> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        ScopedGuard { guard }
    }

    /// 尝试获取锁，已被占用时返回 `None`
    pub fn try_acquire(&self) -> Option<ScopedGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(ScopedGuard { guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(ScopedGuard {
                guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// 在锁内执行闭包，闭包结束即释放
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut guard)
    }

    /// 当前是否被其他守卫持有
    pub fn is_locked(&self) -> bool {
        matches!(self.inner.try_lock(), Err(TryLockError::WouldBlock))
    }

    /// 独占访问（无需加锁）
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// 取出内部数据
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Default> Default for ScopedLock<T> {
    fn default() -> Self {
        ScopedLock::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ScopedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_acquire() {
            Some(guard) => f.debug_struct("ScopedLock").field("data", &*guard).finish(),
            None => f
                .debug_struct("ScopedLock")
                .field("data", &format_args!("<locked>"))
                .finish(),
        }
    }
}

impl<'a, T> ScopedGuard<'a, T> {
    /// 显式释放
    ///
    /// 消耗守卫本身，所以每次获取恰好对应一次释放；之后的 Drop 不会再次解锁。
    pub fn release(self) {
        drop(self);
    }

    /// 释放锁并挂起，直到 `condition` 被唤醒后重新持有锁
    pub fn wait(self, condition: &Condition) -> Self {
        let ScopedGuard { guard } = self;
        let guard = condition
            .inner
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner);
        ScopedGuard { guard }
    }

    /// 带超时的等待，返回 (守卫, 是否超时)
    pub fn wait_timeout(self, condition: &Condition, timeout: Duration) -> (Self, bool) {
        let ScopedGuard { guard } = self;
        let (guard, result) = condition
            .inner
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        (ScopedGuard { guard }, result.timed_out())
    }

    /// 条件成立前一直等待
    pub fn wait_while(self, condition: &Condition, mut blocked: impl FnMut(&mut T) -> bool) -> Self {
        let ScopedGuard { guard } = self;
        let guard = condition
            .inner
            .wait_while(guard, |value| blocked(value))
            .unwrap_or_else(PoisonError::into_inner);
        ScopedGuard { guard }
    }
}

impl<T> Deref for ScopedGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ScopedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for ScopedGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.guard, f)
    }
}

impl Condition {
    pub fn new() -> Self {
        Condition {
            inner: Condvar::new(),
        }
    }

    /// 唤醒一个等待者
    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    /// 唤醒所有等待者
    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_acquire_and_release_on_drop() {
        let lock = ScopedLock::new(0);
        {
            let mut value = lock.acquire();
            *value += 1;
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
        assert_eq!(*lock.acquire(), 1);
    }

    #[test]
    fn test_explicit_release() {
        let lock = ScopedLock::new(String::from("a"));
        let guard = lock.acquire();
        assert!(lock.try_acquire().is_none());
        guard.release();
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_release_on_early_return() {
        fn push_until_limit(lock: &ScopedLock<Vec<u32>>, value: u32) -> Result<(), String> {
            let mut items = lock.acquire();
            if items.len() >= 2 {
                return Err("full".to_string());
            }
            items.push(value);
            Ok(())
        }

        let lock = ScopedLock::new(Vec::new());
        assert!(push_until_limit(&lock, 1).is_ok());
        assert!(push_until_limit(&lock, 2).is_ok());
        assert!(push_until_limit(&lock, 3).is_err());
        // 提前返回后锁必须已经释放
        assert!(!lock.is_locked());
        assert_eq!(lock.acquire().len(), 2);
    }

    #[test]
    fn test_release_on_question_mark() {
        fn parse_into(lock: &ScopedLock<i64>, text: &str) -> Result<(), std::num::ParseIntError> {
            let mut total = lock.acquire();
            *total += text.parse::<i64>()?;
            Ok(())
        }

        let lock = ScopedLock::new(0);
        parse_into(&lock, "5").unwrap();
        assert!(parse_into(&lock, "x").is_err());
        assert!(!lock.is_locked());
        assert_eq!(*lock.acquire(), 5);
    }

    #[test]
    fn test_release_on_panic() {
        let lock = Arc::new(ScopedLock::new(7));
        let cloned = Arc::clone(&lock);
        let handle = thread::spawn(move || {
            let guard = cloned.acquire();
            assert_eq!(*guard, 7);
            panic!("intentional panic while holding the lock");
        });
        assert!(handle.join().is_err());

        // 中毒状态被吸收，数据仍可访问
        assert!(!lock.is_locked());
        assert_eq!(*lock.acquire(), 7);
    }

    #[test]
    fn test_with_closure() {
        let lock = ScopedLock::new(vec![1, 2]);
        let len = lock.with(|items| {
            items.push(3);
            items.len()
        });
        assert_eq!(len, 3);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut lock = ScopedLock::new(1);
        *lock.get_mut() = 2;
        assert_eq!(lock.into_inner(), 2);
    }

    #[test]
    fn test_wait_and_notify() {
        let lock = Arc::new(ScopedLock::new(false));
        let condition = Arc::new(Condition::new());

        let (l, c) = (Arc::clone(&lock), Arc::clone(&condition));
        let waiter = thread::spawn(move || {
            let guard = l.acquire();
            let guard = guard.wait_while(&c, |ready| !*ready);
            *guard
        });

        {
            let mut ready = lock.acquire();
            *ready = true;
        }
        condition.notify_all();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let lock = ScopedLock::new(());
        let condition = Condition::new();
        let guard = lock.acquire();
        let (guard, timed_out) = guard.wait_timeout(&condition, Duration::from_millis(10));
        assert!(timed_out);
        guard.release();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_concurrent_increments() {
        let lock = Arc::new(ScopedLock::new(0usize));
        let barrier = Arc::new(Barrier::new(8));
        let mut handles = vec![];

        for _ in 0..8 {
            let l = Arc::clone(&lock);
            let b = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                b.wait();
                for _ in 0..100 {
                    *l.acquire() += 1;
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.acquire(), 800);
    }

    #[test]
    fn test_debug_output() {
        let lock = ScopedLock::new(3);
        assert!(format!("{lock:?}").contains('3'));
        let guard = lock.acquire();
        assert!(format!("{lock:?}").contains("<locked>"));
        drop(guard);
    }
}
