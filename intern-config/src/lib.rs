//! Intern Config - Pure configuration data structures
//!
//! This crate contains only data structures and their (de)serialization, no
//! global state. It is the shared configuration vocabulary across all intern
//! crates. A configuration file is plain JSON:
//!
//! ```json
//! {
//!   "terminal": { "timeout_secs": 30, "mode": "protocol" },
//!   "logging": { "level": "debug", "ring_buffer": 1000 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file name looked up by programs built on the library
pub const DEFAULT_CONFIG_FILE: &str = "intern.json";

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InternConfig {
    pub terminal: TerminalConfig,
    pub logging: LoggingConfig,
}

/// Configuration for the terminal session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    /// Read timeout in seconds; `None` blocks until a line arrives
    pub timeout_secs: Option<u64>,
    /// How output lines are presented
    pub mode: OutputMode,
}

/// Output presentation of the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Every line tagged (`info:`, `input:`, `output:`, `error:`, `crash:`) for recorders
    #[default]
    Protocol,
    /// Untagged output for humans; errors go to stderr (explicit opt-in)
    Plain,
}

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Global log level
    pub level: LogLevel,
    /// Per-component overrides (None means use `level`)
    pub terminal: Option<LogLevel>,
    pub tokenizer: Option<LogLevel>,
    pub cache: Option<LogLevel>,
    pub bridge: Option<LogLevel>,
    /// Capacity of the crash-dump ring buffer (0 disables it)
    pub ring_buffer: usize,
    /// Optional log file (appended)
    pub file: Option<String>,
    /// Formatter used by binaries
    pub format: LogFormat,
}

/// Log level names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Library component enum for component-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Terminal,
    Tokenizer,
    Cache,
    Bridge,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Terminal,
        Component::Tokenizer,
        Component::Cache,
        Component::Bridge,
    ];

    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Terminal => "terminal",
            Component::Tokenizer => "tokenizer",
            Component::Cache => "cache",
            Component::Bridge => "bridge",
        }
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("intern::{}", self.as_str())
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a level name; `"silent"` means errors only
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" | "silent" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl LoggingConfig {
    /// Effective level for one component
    pub fn level_for(&self, component: Component) -> LogLevel {
        let specific = match component {
            Component::Terminal => self.terminal,
            Component::Tokenizer => self.tokenizer,
            Component::Cache => self.cache,
            Component::Bridge => self.bridge,
        };
        specific.unwrap_or(self.level)
    }

    /// Most verbose level any component uses
    pub fn most_verbose(&self) -> LogLevel {
        Component::ALL
            .iter()
            .map(|c| self.level_for(*c))
            .min()
            .unwrap_or(self.level)
    }
}

impl InternConfig {
    /// Parse configuration from a JSON string and validate it
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: InternConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would otherwise be silently clamped
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terminal.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "terminal.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            terminal: None,
            tokenizer: None,
            cache: None,
            bridge: None,
            ring_buffer: 1000,
            file: None,
            format: LogFormat::default(),
        }
    }
}
