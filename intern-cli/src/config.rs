//! CLI 配置
//!
//! 配置文件（JSON）与命令行参数的组合：命令行参数覆盖文件中的值。

use clap::Parser;
use intern_config::{ConfigError, InternConfig, LogLevel, OutputMode, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "intern",
    about = "Line-oriented command console built on the intern utility library",
    version
)]
pub struct Cli {
    /// Configuration file path (default: ./intern.json, optional)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Read timeout in seconds (must be positive)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Human-readable output: untagged results, errors on stderr
    #[arg(long, conflicts_with = "protocol")]
    pub plain: bool,

    /// Tag every line (info:/input:/output:/error:/crash:)
    #[arg(long)]
    pub protocol: bool,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,
}

fn parse_log_level(name: &str) -> Result<LogLevel, String> {
    LogLevel::parse(name).ok_or_else(|| format!("unknown log level '{name}'"))
}

impl Cli {
    /// 读取配置文件并应用命令行覆盖
    ///
    /// 显式给出的配置文件必须存在；默认文件不存在时使用默认配置。
    pub fn resolve_config(&self) -> Result<InternConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => InternConfig::load(path)?,
            None => InternConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut InternConfig) {
        if let Some(seconds) = self.timeout {
            config.terminal.timeout_secs = Some(seconds);
        }
        if self.plain {
            config.terminal.mode = OutputMode::Plain;
        }
        if self.protocol {
            config.terminal.mode = OutputMode::Protocol;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}
