//! Configuration module for the weixin runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for the application credentials, logging and context entries.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig, WeixinConfig,
};
pub use validation::{AES_KEY_LENGTH, validate_config};
