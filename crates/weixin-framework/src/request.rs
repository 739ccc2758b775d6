//! The per-dispatch request handed to handlers.

use std::sync::Arc;

use weixin_core::{Context, Message, Storage};

/// One inbound message together with the shared [`Context`].
///
/// A `Request` is created per dispatch and shared (`Arc<Request>`) between
/// the primary handler and the finish hook.
#[derive(Debug)]
pub struct Request {
    message: Message,
    context: Arc<Context>,
}

impl Request {
    pub fn new(message: Message, context: Arc<Context>) -> Self {
        Self { message, context }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Shortcut for the storage handle in the context.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.context.storage()
    }

    /// Text content of the message, empty when absent.
    pub fn content(&self) -> &str {
        self.message.content().unwrap_or_default()
    }
}
