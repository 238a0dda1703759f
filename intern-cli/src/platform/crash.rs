//! 崩溃输出
//!
//! 进程内任何 panic 都作为崩溃处理：写出 `crash:` 行和环形缓冲区中最近的日志，
//! 然后以失败码退出。

use intern_core::terminal::{ExitStatus, Terminal};
use intern_log::LogRingBuffer;
use std::sync::Arc;

/// 崩溃时回放的日志条数
const CRASH_TAIL: usize = 20;

/// 崩溃报告的全部行
pub fn crash_report(message: &str, ring: Option<&LogRingBuffer>) -> Vec<String> {
    let mut lines: Vec<String> = message.lines().map(str::to_string).collect();
    if let Some(ring) = ring {
        let records = ring.tail(CRASH_TAIL);
        if !records.is_empty() {
            lines.push(format!("last {} log record(s):", records.len()));
            lines.extend(records.iter().map(|record| record.format()));
        }
    }
    lines
}

/// 安装 panic hook
pub fn install_crash_hook(terminal: Arc<Terminal>, ring: Option<Arc<LogRingBuffer>>) {
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(target: crate::logging::TARGET, "{info}");
        let report = crash_report(&info.to_string(), ring.as_deref());
        // 写不出去也要退出
        let _ = terminal.print_crash(&report.join("\n"));
        terminal.exit(ExitStatus::Failure);
    }));
}
