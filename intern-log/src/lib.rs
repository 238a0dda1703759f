//! intern-log - 结构化日志系统
//!
//! 为 intern 工具库设计的结构化日志系统，特点：
//! - **显式传递**：无全局logger，组件在构造时接收 `Arc<Logger>`
//! - **不打扰协议流**：推荐输出到 stderr，stdout 留给终端协议
//! - **崩溃回放**：环形缓冲区保留最后N条日志
//!
//! # 快速开始
//!
//! ```toml
//! [dependencies]
//! intern-log = { version = "0.1", features = ["stderr", "file"] }
//! ```
//!
//! ```
//! use intern_log::{debug, Level, LogRingBuffer, Logger};
//!
//! let ring = LogRingBuffer::new(1000);
//! let logger = Logger::new(Level::Debug).with_sink(ring.clone());
//! debug!(logger, "cache miss for {}", "fib(30)");
//! assert_eq!(ring.len(), 1);
//! ```

mod config;
mod logger;
mod macros;
mod record;
mod ring_buffer;

pub use config::{LogConfig, OutputConfig};
pub use logger::{FileSink, LogSink, Logger, StderrSink};
pub use record::{Level, Record};
pub use ring_buffer::{LogRingBuffer, RingBufferStats};

// 宏通过 #[macro_export] 自动导出到 crate 根：
// trace!, debug!, info!, warn!, error!, log!

/// 日志结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// 日志系统错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 日志文件无法打开
    #[error("cannot open log file '{path}': {source}")]
    FileSink {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
