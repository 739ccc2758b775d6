//! # Weixin Framework
//!
//! Routing and dispatch for webhook messages.
//!
//! This layer provides:
//! - Axum-style handlers with parameter extraction ([`Handler`], [`FromRequest`])
//! - Routing-key derivation from message shape ([`KeyResolver`])
//! - The handler table with default fallback ([`Registry`])
//! - Keyword and regex routing for text messages ([`FilterChain`])
//! - A builder-style registration surface ([`Router`])
//! - The per-message pipeline, also usable as a `tower::Service` ([`Dispatcher`])
//!
//! ```rust,ignore
//! use weixin_framework::{Content, Dispatcher, Router};
//!
//! let router = Router::new()
//!     .subscribe(|| async { "thanks for following!" })
//!     .filter(["签到"], || async { "signed in" })?
//!     .filter_default(|Content(text): Content| async move { text });
//!
//! let dispatcher = Dispatcher::new(router, codec, renderer);
//! ```

pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod handler;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod router;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult, ExtractError, ExtractResult, FilterError};
pub use extractor::{Content, EventKey, Extension, FromRequest, Sender};
pub use filter::{FilterChain, FilterEntry, FilterPattern};
pub use handler::{BoxedHandler, Handler, HandlerResponse, HandlerResult, into_handler, noop};
pub use registry::{Endpoint, Registry};
pub use request::Request;
pub use resolver::KeyResolver;
pub use router::Router;

pub use tower::BoxError;
