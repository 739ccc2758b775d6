//! Handler results handed to the renderer.

use serde_json::Value;

/// The value a handler produces for the reply body.
///
/// The core does not interpret it; a [`ReplyRenderer`](crate::ReplyRenderer)
/// turns it into the platform's reply format. A handler that has nothing to
/// say returns no `Reply` at all rather than an empty one.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A plain text reply.
    Text(String),
    /// A structured reply (news articles, media ids, ...) whose shape is
    /// agreed between the handler and the renderer.
    Payload(Value),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the text if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Payload(_) => None,
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Payload(value)
    }
}
