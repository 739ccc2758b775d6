//! # Weixin
//!
//! Message routing and dispatch for WeChat official-account webhooks.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌─────────────┐   ┌──────────┐   ┌───────────────┐
//! │  payload  │──▶│ PayloadCodec │──▶│ KeyResolver │──▶│ Registry │──▶│    handler    │
//! └───────────┘   └──────────────┘   └─────────────┘   └──────────┘   │ (FilterChain) │
//!                                                                     └───────┬───────┘
//!                 ┌───────────────┐   ┌─────────────┐                         │
//!   reply body ◀──│ ReplyRenderer │◀──│ finish hook │◀────────────────────────┘
//!                 └───────────────┘   └─────────────┘
//! ```
//!
//! - **Core**: messages, routing keys, context, storage and the codec seams
//! - **Framework**: handlers, the registry, text filters and the dispatcher
//! - **Runtime**: configuration, logging and application assembly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weixin::prelude::*;
//!
//! async fn echo(Content(text): Content) -> String {
//!     text
//! }
//!
//! let router = Router::new()
//!     .subscribe(|| async { "thanks for following!" })
//!     .click_key("V1001_TODAY_MUSIC", || async { "today's pick: ..." })
//!     .filter(["签到", "sign"], sign_in)?
//!     .filter_default(echo);
//!
//! let app = WeixinApp::builder()
//!     .codec(my_xml_codec)
//!     .renderer(my_xml_renderer)
//!     .router(router)
//!     .build()?;
//!
//! let body = app.dispatch(&request_body).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use weixin_core as core;
pub use weixin_framework as framework;
pub use weixin_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use weixin::prelude::*;
/// ```
pub mod prelude {
    // Application assembly
    pub use weixin_runtime::{WeixinApp, WeixinConfig};

    // Registration and dispatch
    pub use weixin_framework::{DispatchError, Dispatcher, FilterPattern, Router};

    // Extractors - for handler parameters
    pub use weixin_framework::{Content, EventKey, Extension, Request, Sender};

    // Data types
    pub use weixin_core::{
        Context, Credentials, MemoryStorage, Message, Reply, RoutingKey, Storage, event, msg_type,
    };

    // Collaborator seams
    pub use weixin_core::{DecodeError, PayloadCodec, RenderError, ReplyRenderer};

    // Logging macros
    pub use weixin_runtime::prelude::*;
}
