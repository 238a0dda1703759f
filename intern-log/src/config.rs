//! 日志配置
//!
//! 提供便捷的日志初始化配置。

#[cfg(feature = "file")]
use crate::logger::FileSink;
#[cfg(feature = "stderr")]
use crate::logger::StderrSink;
use crate::{Level, LogRingBuffer, Logger};
use std::sync::Arc;

/// 日志输出目标配置
#[derive(Clone, Debug, PartialEq)]
pub enum OutputConfig {
    /// 输出到标准错误
    #[cfg(feature = "stderr")]
    Stderr,
    /// 输出到文件（路径）
    #[cfg(feature = "file")]
    File(String),
    /// 输出到环形缓冲区（容量）
    RingBuffer(usize),
}

/// 日志配置
///
/// 用于一键初始化日志系统
///
/// # 示例
///
/// ```
/// use intern_log::{LogConfig, Level};
///
/// let config = LogConfig::new(Level::Debug)
///     .with_ring_buffer(10000);
///
/// let (logger, ring) = config.init();
/// assert!(ring.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: Level,
    /// 输出目标列表
    pub outputs: Vec<OutputConfig>,
}

impl LogConfig {
    /// 创建配置（无输出）
    pub fn new(level: Level) -> Self {
        LogConfig {
            level,
            outputs: Vec::new(),
        }
    }

    /// 开发环境推荐配置：Debug 级别，输出到 stderr（stdout 留给终端协议），
    /// 另保留 10000 条环形缓冲区用于崩溃转储
    #[cfg(feature = "stderr")]
    pub fn dev() -> Self {
        LogConfig {
            level: Level::Debug,
            outputs: vec![OutputConfig::Stderr, OutputConfig::RingBuffer(10000)],
        }
    }

    /// 测试环境配置（静默）
    pub fn test() -> Self {
        LogConfig {
            level: Level::Error,
            outputs: Vec::new(),
        }
    }

    #[cfg(feature = "stderr")]
    pub fn with_stderr(mut self) -> Self {
        if !self.outputs.contains(&OutputConfig::Stderr) {
            self.outputs.push(OutputConfig::Stderr);
        }
        self
    }

    #[cfg(feature = "file")]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.outputs.push(OutputConfig::File(path.into()));
        self
    }

    /// 添加环形缓冲区输出
    pub fn with_ring_buffer(mut self, capacity: usize) -> Self {
        self.outputs.push(OutputConfig::RingBuffer(capacity));
        self
    }

    /// 严格初始化：文件输出打不开时返回错误
    pub fn try_init(self) -> crate::Result<(Arc<Logger>, Option<Arc<LogRingBuffer>>)> {
        #[cfg(feature = "file")]
        for output in &self.outputs {
            if let OutputConfig::File(path) = output {
                FileSink::new(path).map_err(|source| crate::Error::FileSink {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        Ok(self.init())
    }

    /// 初始化日志系统
    ///
    /// 返回 (logger, Option<ring_buffer>)
    /// 如果配置了环形缓冲区，会返回最后一个（用于崩溃转储）
    pub fn init(self) -> (Arc<Logger>, Option<Arc<LogRingBuffer>>) {
        let logger = Logger::new(self.level);
        let mut ring_buffer: Option<Arc<LogRingBuffer>> = None;

        for output in self.outputs {
            match output {
                #[cfg(feature = "stderr")]
                OutputConfig::Stderr => logger.add_sink(StderrSink),
                #[cfg(feature = "file")]
                OutputConfig::File(path) => match FileSink::new(&path) {
                    Ok(sink) => logger.add_sink(sink),
                    // 文件不可用时退回 stderr，而不是让初始化失败
                    Err(e) => {
                        eprintln!("intern-log: cannot open log file '{path}': {e}");
                        logger.add_sink(crate::logger::StderrSink);
                    }
                },
                OutputConfig::RingBuffer(capacity) => {
                    let ring = LogRingBuffer::new(capacity);
                    ring_buffer = Some(Arc::clone(&ring));
                    logger.add_sink(ring);
                }
            }
        }

        (logger, ring_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = LogConfig::new(Level::Debug);
        assert_eq!(config.level, Level::Debug);
        assert!(config.outputs.is_empty());
    }

    #[test]
    fn test_config_test_is_silent() {
        let (logger, ring) = LogConfig::test().init();
        assert_eq!(logger.level(), Level::Error);
        assert_eq!(logger.sink_count(), 0);
        assert!(ring.is_none());
    }

    #[cfg(feature = "stderr")]
    #[test]
    fn test_config_dev() {
        let config = LogConfig::dev();
        assert_eq!(config.level, Level::Debug);
        assert!(config.outputs.contains(&OutputConfig::Stderr));
        assert!(config
            .outputs
            .iter()
            .any(|o| matches!(o, OutputConfig::RingBuffer(10000))));
    }

    #[cfg(feature = "stderr")]
    #[test]
    fn test_with_stderr_deduplicates() {
        let config = LogConfig::new(Level::Warn).with_stderr().with_stderr();
        let count = config
            .outputs
            .iter()
            .filter(|o| matches!(o, OutputConfig::Stderr))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_try_init_without_files() {
        let (logger, ring) = LogConfig::new(Level::Info).with_ring_buffer(4).try_init().unwrap();
        assert_eq!(logger.sink_count(), 1);
        assert_eq!(ring.unwrap().capacity(), 4);
    }

    #[test]
    fn test_config_init() {
        let (logger, ring) = LogConfig::new(Level::Debug).with_ring_buffer(100).init();

        assert_eq!(logger.level(), Level::Debug);
        crate::debug!(logger, "test message");
        let records = ring.unwrap().dump_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "test message");
    }
}
