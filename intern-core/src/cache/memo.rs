//! 记忆化计算缓存
//!
//! 条目表由一把 [`ScopedLock`] 保护，临界区只做 O(1) 的元数据操作；
//! 真正的计算在锁外执行。每个正在计算的 key 有自己的槽位（锁 + 条件变量），
//! 等待者只在自己关心的槽位上挂起，互不相关的 key 之间不会相互阻塞。
//!
//! 状态转换：
//!
//! ```text
//! (无条目) --miss--> Pending(slot) --Ok--> Resolved(value)
//!                           |
//!                           +--Err / panic--> (无条目)
//! ```

use super::error::CacheError;
use intern_log::{debug, trace, warn, Logger};
use intern_sync::{Condition, ScopedLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 缓存统计信息
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 已解析的条目数
    pub entries: usize,
    /// 命中已解析条目的次数
    pub hits: u64,
    /// 触发计算的次数
    pub misses: u64,
    /// 等待他人计算的次数
    pub waits: u64,
    /// 计算返回错误的次数
    pub failures: u64,
    /// 计算被中断的次数
    pub interrupts: u64,
}

type Outcome<R, E> = Result<R, CacheError<E>>;

/// 单个 key 的计算槽位
struct Slot<R, E> {
    outcome: ScopedLock<Option<Outcome<R, E>>>,
    ready: Condition,
}

impl<R: Clone, E> Slot<R, E> {
    fn pending() -> Self {
        Slot {
            outcome: ScopedLock::new(None),
            ready: Condition::new(),
        }
    }

    /// 写入结果并唤醒所有等待者（每个槽位只会写一次）
    fn settle(&self, outcome: Outcome<R, E>) {
        let mut current = self.outcome.acquire();
        if current.is_none() {
            *current = Some(outcome);
        }
        current.release();
        self.ready.notify_all();
    }

    fn wait(&self) -> Outcome<R, E> {
        let outcome = self
            .outcome
            .acquire()
            .wait_while(&self.ready, |outcome| outcome.is_none());
        match &*outcome {
            Some(result) => result.clone(),
            None => Err(CacheError::Interrupted),
        }
    }
}

enum Entry<R, E> {
    Resolved(R),
    Pending(Arc<Slot<R, E>>),
}

enum Lookup<R, E> {
    Hit(R),
    Wait(Arc<Slot<R, E>>),
    Compute(Arc<Slot<R, E>>),
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    waits: AtomicU64,
    failures: AtomicU64,
    interrupts: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 线程安全的记忆化缓存
///
/// 同一个 key 的计算最多同时进行一次；成功结果永久保留，失败与中断不会被缓存。
///
/// # 示例
///
/// ```
/// use intern_core::cache::MemoizingCache;
///
/// let cache: MemoizingCache<u32, u64, String> = MemoizingCache::new();
/// let value = cache.get(10, || Ok(55)).unwrap();
/// assert_eq!(value, 55);
/// // 第二次调用不会再执行计算
/// let value = cache.get(10, || Err("not called".to_string())).unwrap();
/// assert_eq!(value, 55);
/// ```
pub struct MemoizingCache<K, R, E> {
    table: ScopedLock<HashMap<K, Entry<R, E>>>,
    counters: Counters,
    logger: Arc<Logger>,
}

impl<K, R, E> MemoizingCache<K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        MemoizingCache {
            table: ScopedLock::new(HashMap::new()),
            counters: Counters::default(),
            logger,
        }
    }

    /// 获取 `key` 的值，必要时调用 `compute`
    ///
    /// - 已解析：直接返回副本，不调用 `compute`
    /// - 计算中：等待该次计算的结果，不调用 `compute`
    /// - 不存在：在锁外调用 `compute` 恰好一次，并唤醒所有等待者
    ///
    /// `compute` panic 时，等待者收到 [`CacheError::Interrupted`]，panic 继续向上传播。
    pub fn get<F>(&self, key: K, compute: F) -> Result<R, CacheError<E>>
    where
        F: FnOnce() -> Result<R, E>,
    {
        let lookup = {
            let mut table = self.table.acquire();
            let lookup = match table.get(&key) {
                Some(Entry::Resolved(value)) => Lookup::Hit(value.clone()),
                Some(Entry::Pending(slot)) => Lookup::Wait(Arc::clone(slot)),
                None => {
                    let slot = Arc::new(Slot::pending());
                    table.insert(key.clone(), Entry::Pending(Arc::clone(&slot)));
                    Lookup::Compute(slot)
                }
            };
            lookup
        };

        match lookup {
            Lookup::Hit(value) => {
                Counters::bump(&self.counters.hits);
                trace!(self.logger, "Cache hit for {:?}", key);
                Ok(value)
            }
            Lookup::Wait(slot) => {
                Counters::bump(&self.counters.waits);
                debug!(self.logger, "Waiting for pending computation of {:?}", key);
                slot.wait()
            }
            Lookup::Compute(slot) => {
                Counters::bump(&self.counters.misses);
                debug!(self.logger, "Cache miss for {:?}, computing", key);
                let pending = PendingComputation {
                    cache: self,
                    key,
                    slot,
                    settled: false,
                };
                let result = compute();
                pending.settle(result)
            }
        }
    }

    /// 已解析的值（不触发计算，也不等待）
    pub fn peek(&self, key: &K) -> Option<R> {
        match self.table.acquire().get(key) {
            Some(Entry::Resolved(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// 是否存在已解析的条目
    pub fn contains_key(&self, key: &K) -> bool {
        matches!(self.table.acquire().get(key), Some(Entry::Resolved(_)))
    }

    /// 已解析条目数
    pub fn len(&self) -> usize {
        self.table
            .acquire()
            .values()
            .filter(|entry| matches!(entry, Entry::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            waits: self.counters.waits.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            interrupts: self.counters.interrupts.load(Ordering::Relaxed),
        }
    }

    /// 只在条目仍然是 `slot` 时才修改表
    fn replace_pending(&self, key: &K, slot: &Arc<Slot<R, E>>, resolved: Option<R>) {
        let mut table = self.table.acquire();
        let owned = matches!(
            table.get(key),
            Some(Entry::Pending(current)) if Arc::ptr_eq(current, slot)
        );
        if !owned {
            return;
        }
        match resolved {
            Some(value) => {
                table.insert(key.clone(), Entry::Resolved(value));
            }
            None => {
                table.remove(key);
            }
        }
    }
}

impl<K, R, E> Default for MemoizingCache<K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R, E> std::fmt::Debug for MemoizingCache<K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizingCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// 正在进行的计算
///
/// 未调用 `settle` 就被 Drop（计算 panic 展开）时视为中断。
struct PendingComputation<'c, K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    cache: &'c MemoizingCache<K, R, E>,
    key: K,
    slot: Arc<Slot<R, E>>,
    settled: bool,
}

impl<K, R, E> PendingComputation<'_, K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    fn settle(mut self, result: Result<R, E>) -> Result<R, CacheError<E>> {
        self.settled = true;
        let outcome = result.map_err(|err| CacheError::Failed(Arc::new(err)));
        match &outcome {
            Ok(value) => {
                self.cache
                    .replace_pending(&self.key, &self.slot, Some(value.clone()));
                debug!(self.cache.logger, "Resolved {:?}", self.key);
            }
            Err(_) => {
                self.cache.replace_pending(&self.key, &self.slot, None);
                Counters::bump(&self.cache.counters.failures);
                debug!(self.cache.logger, "Computation of {:?} failed", self.key);
            }
        }
        // 先更新条目表，再唤醒等待者
        self.slot.settle(outcome.clone());
        outcome
    }
}

impl<K, R, E> Drop for PendingComputation<'_, K, R, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    R: Clone,
{
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.cache.replace_pending(&self.key, &self.slot, None);
        Counters::bump(&self.cache.counters.interrupts);
        warn!(
            self.cache.logger,
            "Computation of {:?} was interrupted; waiters released",
            self.key
        );
        self.slot.settle(Err(CacheError::Interrupted));
    }
}
