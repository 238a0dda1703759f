//! 终端会话
//!
//! 进程内只构造一次，通过 `Arc<Terminal>` 共享。所有输出按整行串行化，
//! 每一行（含换行符）一次 `write_all` 写出后立即 flush，不会与其他线程的输出交错。

use super::error::{ExitStatus, TerminalError};
use super::input::{LineReader, ReadOutcome, Received};
use super::prefix::Prefix;
use crate::error::InternError;
use intern_config::{OutputMode, TerminalConfig};
use intern_log::{debug, info, trace, warn, Logger};
use intern_sync::ScopedLock;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

type Sink = Box<dyn Write + Send>;

struct Sinks {
    output: Sink,
    errors: Sink,
}

impl Sinks {
    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()?;
        self.errors.flush()
    }
}

/// 终端会话
pub struct Terminal {
    reader: LineReader,
    sinks: ScopedLock<Sinks>,
    read_timeout: ScopedLock<Option<Duration>>,
    mode: OutputMode,
    logger: Arc<Logger>,
}

impl Terminal {
    /// 使用进程的标准输入/输出/错误输出
    pub fn stdio(config: &TerminalConfig) -> Result<Self, TerminalError> {
        Self::stdio_with_logger(config, Logger::noop())
    }

    pub fn stdio_with_logger(
        config: &TerminalConfig,
        logger: Arc<Logger>,
    ) -> Result<Self, TerminalError> {
        let mut builder = Terminal::builder()
            .input(BufReader::new(io::stdin()))
            .output(io::stdout())
            .errors(io::stderr())
            .mode(config.mode)
            .logger(logger);
        if let Some(seconds) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        builder.build()
    }

    pub fn builder() -> TerminalBuilder {
        TerminalBuilder::default()
    }

    /// 设置之后所有读取的超时，立即生效
    ///
    /// `seconds <= 0` 返回配置错误，不会被修正。
    pub fn configure_timeout(&self, seconds: i64) -> Result<(), TerminalError> {
        if seconds <= 0 {
            warn!(self.logger, "Rejected read timeout of {}s", seconds);
            return Err(TerminalError::Configuration { seconds });
        }
        let timeout = Duration::from_secs(seconds.unsigned_abs());
        *self.read_timeout.acquire() = Some(timeout);
        debug!(self.logger, "Read timeout set to {:?}", timeout);
        Ok(())
    }

    /// 恢复为阻塞读取
    pub fn clear_timeout(&self) {
        *self.read_timeout.acquire() = None;
        debug!(self.logger, "Read timeout cleared");
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        *self.read_timeout.acquire()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// 读取一整行
    ///
    /// 超时只结束这一次调用；稍后到达的那一行会完整地交给下一次读取。
    pub fn read_line(&self) -> Result<ReadOutcome, TerminalError> {
        let timeout = self.read_timeout();
        match self.reader.recv(timeout) {
            Received::Outcome(ReadOutcome::Line(line)) => {
                trace!(self.logger, "Read line of {} byte(s)", line.len());
                // 回显失败不能吞掉已经读出的行
                if self.mode == OutputMode::Protocol {
                    if let Err(err) = self.emit(Prefix::Input, &line) {
                        warn!(self.logger, "Failed to echo input line: {}", err);
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Received::Outcome(ReadOutcome::EndOfInput) => {
                debug!(self.logger, "End of input");
                Ok(ReadOutcome::EndOfInput)
            }
            Received::TimedOut => {
                // 只有设置了超时才可能走到这里
                let timeout = timeout.unwrap_or_default();
                info!(self.logger, "Read timed out after {:?}", timeout);
                Err(TerminalError::ReadTimeout { timeout })
            }
            Received::Failed(err) => {
                warn!(self.logger, "Input failed: {}", err);
                Err(TerminalError::Io(err))
            }
        }
    }

    /// 普通输出
    pub fn print_line(&self, text: &str) -> Result<(), TerminalError> {
        self.emit(Prefix::Output, text)
    }

    pub fn print_info(&self, text: &str) -> Result<(), TerminalError> {
        self.emit(Prefix::Info, text)
    }

    pub fn print_error(&self, text: &str) -> Result<(), TerminalError> {
        self.emit(Prefix::Error, text)
    }

    pub fn print_crash(&self, text: &str) -> Result<(), TerminalError> {
        self.emit(Prefix::Crash, text)
    }

    /// 把任意库错误呈现为一行错误输出
    pub fn report(&self, err: &InternError) -> Result<(), TerminalError> {
        debug!(self.logger, "Reporting {} error: {}", err.category(), err);
        self.print_error(&err.to_string())
    }

    /// 按模式格式化并写出
    ///
    /// 内容中的换行会拆成多行，每一行都带上前缀，但整体仍然只写一次。
    pub fn emit(&self, prefix: Prefix, text: &str) -> Result<(), TerminalError> {
        let rendered = render(self.mode, prefix, text);
        let mut sinks = self.sinks.acquire();
        let sink = match (self.mode, prefix.plain_label()) {
            (OutputMode::Plain, Some(_)) => &mut sinks.errors,
            _ => &mut sinks.output,
        };
        sink.write_all(rendered.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// flush 所有输出，不退出进程
    pub fn shutdown(&self) -> Result<(), TerminalError> {
        self.sinks.acquire().flush()?;
        debug!(self.logger, "Terminal flushed");
        Ok(())
    }

    /// flush 所有输出后以 `status` 退出进程
    pub fn exit(&self, status: ExitStatus) -> ! {
        if let Err(err) = self.shutdown() {
            warn!(self.logger, "Flush before exit failed: {}", err);
        }
        info!(self.logger, "Exiting with code {}", status.code());
        std::process::exit(status.code())
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("mode", &self.mode)
            .field("read_timeout", &self.read_timeout())
            .finish()
    }
}

fn render(mode: OutputMode, prefix: Prefix, text: &str) -> String {
    let mut rendered = String::with_capacity(text.len() + 16);
    let mut push_line = |line: &str| {
        match (mode, prefix.plain_label()) {
            (OutputMode::Protocol, _) => {
                rendered.push_str(prefix.tag());
                rendered.push(' ');
            }
            (OutputMode::Plain, Some(label)) => {
                rendered.push_str(label);
                rendered.push_str(", ");
            }
            (OutputMode::Plain, None) => {}
        }
        rendered.push_str(line);
        rendered.push('\n');
    };
    if text.is_empty() {
        push_line("");
    } else {
        text.lines().for_each(&mut push_line);
    }
    rendered
}

/// [`Terminal`] 构造器
///
/// 未指定的输入/输出默认使用进程的标准流。
#[derive(Default)]
pub struct TerminalBuilder {
    input: Option<Box<dyn BufRead + Send>>,
    output: Option<Sink>,
    errors: Option<Sink>,
    logger: Option<Arc<Logger>>,
    mode: OutputMode,
    timeout: Option<Duration>,
}

impl TerminalBuilder {
    pub fn input<R: BufRead + Send + 'static>(mut self, input: R) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn errors<W: Write + Send + 'static>(mut self, errors: W) -> Self {
        self.errors = Some(Box::new(errors));
        self
    }

    pub fn logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 启动读线程并构造终端
    pub fn build(self) -> Result<Terminal, TerminalError> {
        let logger = self.logger.unwrap_or_else(Logger::noop);
        let input = self
            .input
            .unwrap_or_else(|| Box::new(BufReader::new(io::stdin())));
        let reader = LineReader::spawn(input, Arc::clone(&logger))?;
        debug!(
            logger,
            "Terminal started in {:?} mode (timeout {:?})",
            self.mode,
            self.timeout
        );
        Ok(Terminal {
            reader,
            sinks: ScopedLock::new(Sinks {
                output: self.output.unwrap_or_else(|| Box::new(io::stdout())),
                errors: self.errors.unwrap_or_else(|| Box::new(io::stderr())),
            }),
            read_timeout: ScopedLock::new(self.timeout.filter(|t| !t.is_zero())),
            mode: self.mode,
            logger,
        })
    }
}
