//! 日志器实现

use crate::record::{Level, Record};
use intern_sync::ScopedLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// 日志输出目标trait
pub trait LogSink: Send + Sync {
    /// 写入日志记录
    fn write(&self, record: &Record);
}

/// 日志器
///
/// 不存在全局 logger：组件通过构造参数接收 `Arc<Logger>`。
pub struct Logger {
    /// 当前日志级别（原子存储）
    level: AtomicU8,
    sinks: ScopedLock<Vec<Box<dyn LogSink>>>,
}

impl Logger {
    pub fn new(level: Level) -> Arc<Self> {
        Arc::new(Logger {
            level: AtomicU8::new(level as u8),
            sinks: ScopedLock::new(Vec::new()),
        })
    }

    /// 添加输出目标（链式）
    pub fn with_sink<S: LogSink + 'static>(self: Arc<Self>, sink: S) -> Arc<Self> {
        self.add_sink(sink);
        self
    }

    /// 添加输出目标
    pub fn add_sink<S: LogSink + 'static>(&self, sink: S) {
        self.sinks.acquire().push(Box::new(sink));
    }

    /// 动态设置日志级别
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// 检查指定级别是否启用
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 记录日志（宏的落点）
    #[inline(never)]
    pub fn log(&self, level: Level, target: &'static str, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }

        let record = Record::new(level, target, message);
        let sinks = self.sinks.acquire();
        for sink in sinks.iter() {
            sink.write(&record);
        }
    }

    /// sink 数量
    pub fn sink_count(&self) -> usize {
        self.sinks.acquire().len()
    }

    /// 不输出任何内容的日志器（测试或禁用场景）
    pub fn noop() -> Arc<Self> {
        Self::new(Level::Error)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("sinks", &self.sink_count())
            .finish()
    }
}

// 链式日志器：把记录转发给另一个 logger
impl LogSink for Arc<Logger> {
    fn write(&self, record: &Record) {
        self.log(record.level, record.target, record.message.clone());
    }
}

/// 标准错误sink
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, record: &Record) {
        eprintln!("{}", record.format());
    }
}

/// 文件sink（追加模式）
pub struct FileSink {
    file: ScopedLock<std::fs::File>,
}

impl FileSink {
    pub fn new(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(FileSink {
            file: ScopedLock::new(file),
        })
    }
}

impl LogSink for FileSink {
    #[inline(never)]
    fn write(&self, record: &Record) {
        use std::io::Write;
        let mut file = self.file.acquire();
        // 日志写失败不能反过来影响业务路径
        let _ = writeln!(file, "{}", record.format());
    }
}
