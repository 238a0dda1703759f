//! 平台相关：进程级 panic 处理

mod crash;

pub use crash::install_crash_hook;
