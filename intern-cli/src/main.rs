//! Intern CLI - line-oriented command console
//!
//! Reads commands from stdin through the terminal session; configuration from
//! `intern.json` (optional) overridden by command line flags.

use clap::Parser;
use intern_core::terminal::{ExitStatus, ReadOutcome, Terminal};
use intern_core::{ComponentLoggers, InternError};
use std::process;
use std::sync::Arc;

mod builtins;
mod commands;
mod config;
mod logging;
mod platform;

use crate::commands::{Flow, Session};
use crate::config::Cli;
use crate::logging::TARGET;
use crate::platform::install_crash_hook;

fn main() {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(ExitStatus::Failure.code());
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Warning: tracing already initialized: {}", e);
    }

    let loggers = match ComponentLoggers::from_config(&config.logging) {
        Ok(loggers) => loggers,
        Err(e) => {
            eprintln!("Error: {}", InternError::from(e));
            process::exit(ExitStatus::Failure.code());
        }
    };

    let terminal = match Terminal::stdio_with_logger(&config.terminal, Arc::clone(&loggers.terminal)) {
        Ok(terminal) => Arc::new(terminal),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(ExitStatus::Failure.code());
        }
    };
    install_crash_hook(Arc::clone(&terminal), loggers.ring.clone());

    tracing::info!(
        target: TARGET,
        mode = ?config.terminal.mode,
        timeout = ?terminal.read_timeout(),
        "session started"
    );

    let status = match Session::new(Arc::clone(&terminal), &loggers) {
        Ok(session) => run(&session),
        Err(e) => {
            let _ = terminal.report(&e);
            ExitStatus::Failure
        }
    };

    tracing::info!(target: TARGET, code = status.code(), "session finished");
    terminal.exit(status)
}

/// 主循环：读一行、处理一行
///
/// 输入结束或 `quit` 正常退出；读取超时与 I/O 失败以失败码退出；
/// 其他错误报告后继续。
fn run(session: &Session) -> ExitStatus {
    let terminal = session.terminal();
    loop {
        let line = match terminal.read_line() {
            Ok(ReadOutcome::Line(line)) => line,
            Ok(ReadOutcome::EndOfInput) => return ExitStatus::Success,
            Err(e) => {
                let e = InternError::from(e);
                tracing::warn!(target: TARGET, category = e.category(), "read failed: {}", e);
                let _ = terminal.report(&e);
                return ExitStatus::Failure;
            }
        };

        match session.handle_line(&line) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return ExitStatus::Success,
            Err(e) => {
                tracing::debug!(target: TARGET, category = e.category(), "command failed: {}", e);
                if terminal.report(&e).is_err() {
                    return ExitStatus::Failure;
                }
            }
        }
    }
}
