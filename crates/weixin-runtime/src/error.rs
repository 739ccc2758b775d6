//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while assembling an application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No payload codec was supplied.
    #[error("No payload codec configured")]
    MissingCodec,

    /// No reply renderer was supplied.
    #[error("No reply renderer configured")]
    MissingRenderer,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
