//! 日志宏
//!
//! 第一个参数是 `Arc<Logger>`（或任何能 `.is_enabled()` / `.log()` 的表达式），
//! 只求值一次。可选的 `target: "..."` 覆盖默认的 `module_path!()`。
//!
//! ```
//! use intern_log::{info, Level, LogRingBuffer, Logger};
//!
//! let ring = LogRingBuffer::new(8);
//! let logger = Logger::new(Level::Info).with_sink(ring.clone());
//! info!(logger, target: "intern::cache", "{} entries", 3);
//! assert_eq!(ring.dump_records()[0].target, "intern::cache");
//! ```

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Trace, $($rest)+) };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Debug, $($rest)+) };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Info, $($rest)+) };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Warn, $($rest)+) };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Error, $($rest)+) };
}

/// 级别宏的落点；消息只在级别启用时才格式化
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, target: $target:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.is_enabled(level) {
            logger.log(level, $target, ::std::format!($($arg)+));
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $level, target: ::std::module_path!(), $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Level, LogRingBuffer, Logger};

    #[test]
    fn test_level_filtering_in_macros() {
        let ring = LogRingBuffer::new(100);
        let logger = Logger::new(Level::Warn).with_sink(ring.clone());

        trace!(logger, "trace msg");
        debug!(logger, "debug msg");
        info!(logger, "info msg");
        warn!(logger, "warn msg");
        error!(logger, "error msg");

        let records = ring.dump_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[1].level, Level::Error);
    }

    #[test]
    fn test_formatting_and_target() {
        let ring = LogRingBuffer::new(100);
        let logger = Logger::new(Level::Trace).with_sink(ring.clone());

        let name = "key";
        debug!(logger, "computing {}: attempt {}", name, 2);

        let records = ring.dump_records();
        assert_eq!(records[0].message, "computing key: attempt 2");
        assert!(records[0].target.ends_with("macros::tests"));
    }

    #[test]
    fn test_target_override_and_single_evaluation() {
        let ring = LogRingBuffer::new(10);
        let logger = Logger::new(Level::Debug).with_sink(ring.clone());
        let mut lookups = 0;
        let mut fetch = || {
            lookups += 1;
            std::sync::Arc::clone(&logger)
        };

        warn!(fetch(), target: "intern::terminal", "reader {} stopped", 1);
        assert_eq!(lookups, 1);

        let records = ring.dump_records();
        assert_eq!(records[0].target, "intern::terminal");
        assert_eq!(records[0].message, "reader 1 stopped");
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        struct Loud;
        impl std::fmt::Display for Loud {
            fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("formatted although the level is disabled");
            }
        }

        let logger = Logger::new(Level::Error);
        trace!(logger, "{}", Loud);
    }
}
