//! 记忆化缓存并发测试

use intern_core::cache::{CacheError, MemoizingCache};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_concurrent_callers_share_one_computation() {
    let cache: Arc<MemoizingCache<u64, u64, String>> = Arc::new(MemoizingCache::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get(30, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(30));
                    Ok(832_040)
                })
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 832_040);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_failure_is_shared_then_retried() {
    let cache: Arc<MemoizingCache<&str, u32, String>> = Arc::new(MemoizingCache::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get("k", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    Err("unavailable".to_string())
                })
            })
        })
        .collect();

    for handle in handles {
        // 同一时间段内的调用者共享同一次失败；晚到的调用者可能重新计算
        let err = handle.join().unwrap().unwrap_err();
        assert_eq!(err.failure().map(String::as_str), Some("unavailable"));
    }
    assert!(calls.load(Ordering::SeqCst) >= 1);
    assert!(!cache.contains_key(&"k"));
    assert_eq!(cache.get("k", || Ok(1)).unwrap(), 1);
}

#[test]
fn test_slow_key_does_not_block_other_keys() {
    let cache: Arc<MemoizingCache<&str, u32, String>> = Arc::new(MemoizingCache::new());
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let slow = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            cache.get("slow", || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok(1)
            })
        })
    };
    started_rx.recv().unwrap();

    let begin = Instant::now();
    assert_eq!(cache.get("fast", || Ok(2)).unwrap(), 2);
    assert!(begin.elapsed() < Duration::from_secs(1));

    release_tx.send(()).unwrap();
    assert_eq!(slow.join().unwrap().unwrap(), 1);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_interrupted_computation_unblocks_waiters_and_retries() {
    let cache: Arc<MemoizingCache<&str, u32, String>> = Arc::new(MemoizingCache::new());
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let computing = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            let _ = cache.get("k", || {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                panic!("worker crashed");
            });
        })
    };
    started_rx.recv().unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get("k", || Ok(7)))
        })
        .collect();
    while cache.stats().waits < 3 {
        thread::sleep(Duration::from_millis(1));
    }
    release_tx.send(()).unwrap();
    assert!(computing.join().is_err());

    for waiter in waiters {
        assert!(matches!(waiter.join().unwrap(), Err(CacheError::Interrupted)));
    }
    assert_eq!(cache.stats().interrupts, 1);
    assert_eq!(cache.get("k", || Ok(7)).unwrap(), 7);
}

#[test]
fn test_panic_keeps_propagating_on_computing_thread() {
    let cache: MemoizingCache<u8, u8, String> = MemoizingCache::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| cache.get(1, || panic!("boom"))));
    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
}
