//! Weixin Runtime - startup wiring for the weixin framework.
//!
//! This crate provides:
//! - Layered configuration loading and validation (`config`)
//! - Logging setup from the `[logging]` section (`logging`)
//! - Application assembly (`WeixinApp`)
//!
//! ```ignore
//! use weixin_runtime::WeixinApp;
//!
//! let app = WeixinApp::builder()
//!     .codec(codec)
//!     .renderer(renderer)
//!     .router(router)
//!     .build()?;
//! ```
//!
//! Serving HTTP is left to the integrator: [`WeixinApp::dispatch`] takes the
//! raw request body and returns the reply body, and the dispatcher is also a
//! `tower::Service<String>`.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use app::{AppBuilder, WeixinApp};
pub use config::{ConfigError, ConfigLoader, ConfigResult, WeixinConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `instrument`
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
