//! # Weixin Core
//!
//! Data types shared by every layer of the weixin dispatch framework.
//!
//! This crate has no opinion about transports or wire formats. It defines:
//!
//! - **Message model**: the decoded inbound record ([`Message`]) and the
//!   canonical routing token derived from it ([`RoutingKey`])
//! - **Replies**: the opaque value a handler hands back ([`Reply`])
//! - **Context**: ambient configuration shared by all handlers ([`Context`],
//!   [`Credentials`])
//! - **Storage**: the injected key-value capability ([`Storage`],
//!   [`MemoryStorage`])
//! - **Collaborator seams**: decoding and rendering traits implemented
//!   outside the core ([`PayloadCodec`], [`ReplyRenderer`])
//!
//! ```text
//! payload ──▶ PayloadCodec ──▶ Message ──▶ (routing) ──▶ Reply ──▶ ReplyRenderer ──▶ payload
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod key;
pub mod message;
pub mod reply;
pub mod storage;

pub use codec::{PayloadCodec, ReplyRenderer};
pub use context::{Context, ContextBuilder, Credentials};
pub use error::{DecodeError, RenderError, StorageError, StorageResult};
pub use key::RoutingKey;
pub use message::{Message, event, msg_type};
pub use reply::Reply;
pub use storage::{MemoryStorage, Storage};
