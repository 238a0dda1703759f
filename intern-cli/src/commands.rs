//! 命令解释
//!
//! 每一行先交给组合式词法分析器，再按第一个关键字分派：
//!
//! ```text
//! call <name> <args...>   调用内置函数（记忆化）
//! timeout <secs>          设置读取超时
//! stats                   缓存统计
//! echo <rest>             原样输出
//! quit                    退出
//! ```

use crate::builtins::register_builtins;
use crate::logging::TARGET;
use intern_core::bridge::{CachedInvoker, InvocationBridge, Value};
use intern_core::kit::lexer::{
    identifier_module, integer_module, keywords_module, quoted_string_module, whitespace_module,
    Token, Tokenizer, TokenizerError,
};
use intern_core::terminal::Terminal;
use intern_core::{ComponentLoggers, InternError};
use std::sync::Arc;

const KEYWORD: &str = "keyword";
const INTEGER: &str = "integer";
const IDENTIFIER: &str = "identifier";
const STRING: &str = "string";
const WHITESPACE: &str = "whitespace";

const COMMANDS: [&str; 5] = ["call", "timeout", "stats", "echo", "quit"];

/// 处理完一行之后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 构建命令行词法分析器（关键字先于标识符注册）
pub fn command_tokenizer(loggers: &ComponentLoggers) -> Result<Tokenizer, TokenizerError> {
    let tokenizer = Tokenizer::with_logger(Arc::clone(&loggers.tokenizer));
    tokenizer.register(&keywords_module(KEYWORD, &COMMANDS))?;
    tokenizer.register(&integer_module(INTEGER))?;
    tokenizer.register(&identifier_module(IDENTIFIER))?;
    tokenizer.register(&quoted_string_module(STRING))?;
    tokenizer.register(&whitespace_module(WHITESPACE))?;
    tokenizer.freeze()?;
    Ok(tokenizer)
}

/// 一个交互会话
pub struct Session {
    terminal: Arc<Terminal>,
    tokenizer: Tokenizer,
    invoker: CachedInvoker,
}

impl Session {
    pub fn new(terminal: Arc<Terminal>, loggers: &ComponentLoggers) -> Result<Self, InternError> {
        let bridge = InvocationBridge::with_logger(Arc::clone(&loggers.bridge));
        register_builtins(&bridge)?;
        Ok(Session {
            terminal,
            tokenizer: command_tokenizer(loggers)?,
            invoker: CachedInvoker::with_logger(Arc::new(bridge), Arc::clone(&loggers.cache)),
        })
    }

    pub fn terminal(&self) -> &Arc<Terminal> {
        &self.terminal
    }

    /// 处理一行输入
    pub fn handle_line(&self, line: &str) -> Result<Flow, InternError> {
        let mut scan = self.tokenizer.scan(line)?;
        let command = match scan.by_ref().find(|t| !matches!(t, Ok(t) if t.is(WHITESPACE))) {
            Some(token) => token?,
            // 空行
            None => return Ok(Flow::Continue),
        };
        if !command.is(KEYWORD) {
            return Err(InternError::usage(format!(
                "unknown command '{}' (expected one of: {})",
                command.lexeme,
                COMMANDS.join(", ")
            )));
        }
        tracing::debug!(target: TARGET, command = command.lexeme, "dispatching");

        // echo 之后的内容原样输出，不再分词
        if command.lexeme == "echo" {
            let rest = line[command.end..].trim_start_matches(&[' ', '\t'][..]);
            self.terminal.print_line(rest)?;
            return Ok(Flow::Continue);
        }

        let args = scan
            .filter(|t| !matches!(t, Ok(t) if t.is(WHITESPACE)))
            .collect::<Result<Vec<_>, _>>()?;
        match command.lexeme {
            "call" => self.call(&args)?,
            "timeout" => self.timeout(&args)?,
            "stats" => self.stats(&args)?,
            "quit" => return Ok(Flow::Quit),
            other => return Err(InternError::usage(format!("unknown command '{other}'"))),
        }
        Ok(Flow::Continue)
    }

    fn call(&self, args: &[Token<'_>]) -> Result<(), InternError> {
        let (target, rest) = match args.split_first() {
            Some((target, rest)) if target.is(IDENTIFIER) => (target, rest),
            _ => return Err(InternError::usage("usage: call <name> <args...>")),
        };
        let values = rest.iter().map(to_value).collect::<Result<Vec<_>, _>>()?;
        let value = self.invoker.invoke(target.lexeme, &values)?;
        self.terminal.print_line(&value.to_string())?;
        Ok(())
    }

    fn timeout(&self, args: &[Token<'_>]) -> Result<(), InternError> {
        let seconds = match args {
            [token] if token.is(INTEGER) => parse_int(token)?,
            _ => return Err(InternError::usage("usage: timeout <secs>")),
        };
        self.terminal.configure_timeout(seconds)?;
        self.terminal
            .print_info(&format!("read timeout set to {seconds}s"))?;
        Ok(())
    }

    fn stats(&self, args: &[Token<'_>]) -> Result<(), InternError> {
        if !args.is_empty() {
            return Err(InternError::usage("usage: stats"));
        }
        let stats = self.invoker.stats();
        let report = serde_json::json!({
            "entries": stats.entries,
            "hits": stats.hits,
            "misses": stats.misses,
            "waits": stats.waits,
            "failures": stats.failures,
            "interrupts": stats.interrupts,
        });
        self.terminal.print_info(&report.to_string())?;
        Ok(())
    }
}

fn parse_int(token: &Token<'_>) -> Result<i64, InternError> {
    token
        .lexeme
        .parse()
        .map_err(|_| InternError::usage(format!("integer '{}' is out of range", token.lexeme)))
}

/// token 转换为调用参数
fn to_value(token: &Token<'_>) -> Result<Value, InternError> {
    match token.kind.name() {
        INTEGER => parse_int(token).map(Value::Int),
        STRING => Ok(Value::Str(unquote(token.lexeme))),
        IDENTIFIER => Ok(match token.lexeme {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "unit" => Value::Unit,
            word => Value::Str(word.to_string()),
        }),
        _ => Err(InternError::usage(format!(
            "'{}' cannot be used as an argument",
            token.lexeme
        ))),
    }
}

/// 去掉引号并处理转义
fn unquote(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}
