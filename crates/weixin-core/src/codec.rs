//! Seams for the payload decoder and reply renderer.
//!
//! XML parsing, signature checks and message encryption all live behind
//! these two traits. The dispatcher calls [`PayloadCodec::decode`] before
//! routing and [`ReplyRenderer::render`] after the handler ran; it never
//! looks inside either.

use crate::context::Context;
use crate::error::{DecodeError, RenderError};
use crate::message::Message;
use crate::reply::Reply;

/// Turns a raw webhook body into a [`Message`].
///
/// A decoder that can tell the body is encrypted but has no key configured
/// may either fail with [`DecodeError::Decrypt`] or return a message without
/// `MsgType`; both end up as "no reply".
pub trait PayloadCodec: Send + Sync + 'static {
    fn decode(&self, payload: &str, ctx: &Context) -> Result<Message, DecodeError>;
}

/// Turns a handler's [`Reply`] into the platform's reply body.
///
/// The inbound `message` is passed along so the renderer can address the
/// reply (swap sender and recipient) and mirror the inbound encryption mode.
pub trait ReplyRenderer: Send + Sync + 'static {
    fn render(&self, reply: Reply, message: &Message, ctx: &Context)
    -> Result<String, RenderError>;
}

impl<F> PayloadCodec for F
where
    F: Fn(&str) -> Result<Message, DecodeError> + Send + Sync + 'static,
{
    fn decode(&self, payload: &str, _ctx: &Context) -> Result<Message, DecodeError> {
        self(payload)
    }
}
