//! 终端错误类型

use std::io;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// 超时必须是正数秒，不会被静默修正
    #[error("invalid read timeout {seconds}s: must be a positive number of seconds")]
    Configuration { seconds: i64 },

    /// 本次读取在超时内没有等到完整的一行
    #[error("no input line arrived within {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TerminalError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TerminalError::ReadTimeout { .. })
    }
}

/// 进程退出码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    Success = 0,
    Failure = 1,
}

impl ExitStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
    }

    #[test]
    fn test_display() {
        let err = TerminalError::Configuration { seconds: -5 };
        assert!(err.to_string().contains("-5s"));
        let err = TerminalError::ReadTimeout {
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "no input line arrived within 2s");
        assert!(err.is_timeout());
    }
}
