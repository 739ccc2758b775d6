//! Error types for the weixin framework.

use thiserror::Error;
use tower::BoxError;

use weixin_core::RenderError;

/// Returned when a text filter cannot be registered.
///
/// These are startup errors: a router that builds never produces them at
/// request time.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The pattern is not a valid regular expression.
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A keyword filter was given no keywords.
    #[error("keyword filter needs at least one keyword")]
    EmptyKeywords,

    /// A dynamically supplied pattern has a shape that is neither a keyword
    /// list nor a pattern string.
    #[error("unsupported filter pattern: expected a string or a list of strings, got {0}")]
    UnsupportedPattern(&'static str),
}

/// Errors that can occur while extracting a handler parameter.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The message lacks a field the handler asked for.
    #[error("message has no '{0}' field")]
    MissingField(&'static str),

    /// No extension of the requested type was installed in the context.
    #[error("extension not found: {0}")]
    ExtensionNotFound(&'static str),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors surfaced by [`Dispatcher`](crate::Dispatcher).
///
/// Handler failures are not caught by the dispatcher; they are returned here
/// for the transport layer to turn into a failure response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The primary handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The finish hook failed after the primary handler succeeded.
    #[error("finish hook failed: {0}")]
    FinishHook(#[source] BoxError),

    /// The handler's reply could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
