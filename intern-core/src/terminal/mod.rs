//! 终端会话
//!
//! 行输入（可超时）、按前缀分类的行输出、退出码。

mod error;
mod input;
mod prefix;
mod session;

pub use error::{ExitStatus, TerminalError};
pub use input::ReadOutcome;
pub use intern_config::OutputMode;
pub use prefix::Prefix;
pub use session::{Terminal, TerminalBuilder};
