//! 行输入
//!
//! 专用读线程逐行读取输入，通过容量为 0 的同步通道（会合通道）交给读取方。
//! 读线程在交接完成前阻塞在 `send` 上，所以最多预读一行；
//! 读取方超时只是放弃这一次等待，那一行仍然完整地留给下一次读取。

use intern_log::{trace, Logger};
use intern_sync::{Condition, ScopedLock};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// 一次读取的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// 一整行（已去掉行尾的 `\n` / `\r\n`）
    Line(String),
    /// 输入已结束（与空行不同）
    EndOfInput,
}

impl ReadOutcome {
    pub fn into_line(self) -> Option<String> {
        match self {
            ReadOutcome::Line(line) => Some(line),
            ReadOutcome::EndOfInput => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, ReadOutcome::EndOfInput)
    }
}

enum Incoming {
    Line(String),
    End,
    Failed(io::Error),
}

/// `recv` 的结果
pub(crate) enum Received {
    Outcome(ReadOutcome),
    TimedOut,
    Failed(io::Error),
}

/// 读取权：同一时刻只有一个读取方在通道上等待
#[derive(Default)]
struct Turn {
    busy: bool,
    ended: bool,
}

/// 读线程的接收端
pub(crate) struct LineReader {
    /// 只由持有读取权的一方加锁，其他读取方等在 `turn_free` 上
    receiver: ScopedLock<Receiver<Incoming>>,
    turn: ScopedLock<Turn>,
    turn_free: Condition,
}

impl LineReader {
    /// 启动读线程
    pub(crate) fn spawn<R>(input: R, logger: Arc<Logger>) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(0);
        thread::Builder::new()
            .name("intern-input".to_string())
            .spawn(move || read_lines(input, sender, logger))?;
        Ok(LineReader {
            receiver: ScopedLock::new(receiver),
            turn: ScopedLock::new(Turn::default()),
            turn_free: Condition::new(),
        })
    }

    /// 等待下一行，`timeout` 为 `None` 时一直阻塞
    ///
    /// 超时从调用开始计算，包括等待其他读取方让出读取权的时间。
    /// 多个线程同时读取时各自得到不同的行。
    pub(crate) fn recv(&self, timeout: Option<Duration>) -> Received {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        let mut turn = self.turn.acquire();
        loop {
            if turn.ended {
                return Received::Outcome(ReadOutcome::EndOfInput);
            }
            if !turn.busy {
                break;
            }
            turn = match deadline {
                None => turn.wait(&self.turn_free),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Received::TimedOut;
                    }
                    turn.wait_timeout(&self.turn_free, deadline - now).0
                }
            };
        }
        turn.busy = true;
        turn.release();

        let incoming = {
            let receiver = self.receiver.acquire();
            match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match receiver.recv_timeout(remaining) {
                        Ok(incoming) => Some(incoming),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => Some(Incoming::End),
                    }
                }
                None => Some(receiver.recv().unwrap_or(Incoming::End)),
            }
        };

        let mut turn = self.turn.acquire();
        turn.busy = false;
        let received = match incoming {
            None => Received::TimedOut,
            Some(Incoming::Line(line)) => Received::Outcome(ReadOutcome::Line(line)),
            Some(Incoming::End) => {
                turn.ended = true;
                Received::Outcome(ReadOutcome::EndOfInput)
            }
            Some(Incoming::Failed(err)) => {
                turn.ended = true;
                Received::Failed(err)
            }
        };
        turn.release();
        self.turn_free.notify_all();
        received
    }
}

fn read_lines<R: BufRead>(mut input: R, sender: SyncSender<Incoming>, logger: Arc<Logger>) {
    loop {
        let mut line = String::new();
        let incoming = match input.read_line(&mut line) {
            Ok(0) => Incoming::End,
            Ok(_) => Incoming::Line(strip_line_ending(line)),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => Incoming::Failed(err),
        };
        let last = !matches!(incoming, Incoming::Line(_));
        // 接收端已经不存在（终端被丢弃）时安静退出
        if sender.send(incoming).is_err() || last {
            break;
        }
    }
    trace!(logger, target: "intern::terminal", "Input reader finished");
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
