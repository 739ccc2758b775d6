//! Configuration schema definitions.
//!
//! ```toml
//! [app]
//! token = "my-token"
//! app_id = "wx0123456789abcdef"
//! app_secret = "..."
//! encoding_aes_key = "..."   # 43 characters, optional
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//! filters = { weixin_framework = "trace" }
//!
//! [context]
//! welcome = "thanks for following!"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use weixin_core::Credentials;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeixinConfig {
    /// Official-account credentials.
    #[serde(default)]
    pub app: Credentials,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Arbitrary entries made available to handlers through the context.
    #[serde(default)]
    pub context: HashMap<String, Value>,
}

/// Logging settings, consumed by [`crate::logging::init_from_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base log level. `RUST_LOG` takes precedence when set.
    pub level: LogLevel,

    pub format: LogFormat,

    pub output: LogOutput,

    /// Log file location, required when `output = "file"`.
    pub file_path: Option<PathBuf>,

    /// Rotation of the log file.
    pub rotation: LogRotation,

    /// Include thread ids in log lines.
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    pub file_location: bool,

    pub span_events: SpanEventConfig,

    /// Per-module level overrides, e.g. `weixin_framework = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file is rotated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_from_json() {
        let config: LoggingConfig = serde_json::from_value(serde_json::json!({
            "level": "debug",
            "format": "pretty",
            "filters": { "weixin_framework": "trace" },
            "span_events": { "close": true }
        }))
        .unwrap();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.output, LogOutput::Stdout);
        assert_eq!(config.filters["weixin_framework"], LogLevel::Trace);
        assert!(config.span_events.close && !config.span_events.new);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::default().to_string(), "info");
    }
}
