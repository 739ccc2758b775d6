//! Handler parameter extraction.
//!
//! Any type implementing [`FromRequest`] can appear as a parameter of a
//! handler function. Parameters are extracted in order before the handler
//! runs; the first failure becomes the handler's error.
//!
//! ```rust,ignore
//! async fn sign_in(Content(text): Content, Sender(user): Sender, storage: Arc<dyn Storage>)
//!     -> anyhow::Result<String>
//! {
//!     storage.set(&format!("signed:{user}"), true.into(), None)?;
//!     Ok(format!("{user} signed in with '{text}'"))
//! }
//! ```

use std::sync::Arc;

use weixin_core::{Context, Message, Storage};

use crate::error::{ExtractError, ExtractResult};
use crate::request::Request;

/// A trait for types that can be extracted from a [`Request`].
pub trait FromRequest: Sized {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self>;
}

impl FromRequest for Arc<Request> {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        Ok(Arc::clone(req))
    }
}

impl FromRequest for Message {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        Ok(req.message().clone())
    }
}

impl FromRequest for Arc<Context> {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        Ok(Arc::clone(req.context()))
    }
}

impl FromRequest for Arc<dyn Storage> {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        Ok(Arc::clone(req.storage()))
    }
}

/// Extracts nothing on failure instead of failing the handler.
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        Ok(T::from_request(req).ok())
    }
}

/// The text content of a `text` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(pub String);

impl FromRequest for Content {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        req.message()
            .content()
            .map(|c| Self(c.to_string()))
            .ok_or(ExtractError::MissingField("Content"))
    }
}

/// The event key of a keyed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKey(pub String);

impl FromRequest for EventKey {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        req.message()
            .event_key()
            .map(|k| Self(k.to_string()))
            .ok_or(ExtractError::MissingField("EventKey"))
    }
}

/// The sender's open id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender(pub String);

impl FromRequest for Sender {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        req.message()
            .sender()
            .map(|s| Self(s.to_string()))
            .ok_or(ExtractError::MissingField("FromUserName"))
    }
}

/// A typed extension installed in the [`Context`].
#[derive(Debug)]
pub struct Extension<T>(pub Arc<T>);

impl<T: Send + Sync + 'static> FromRequest for Extension<T> {
    fn from_request(req: &Arc<Request>) -> ExtractResult<Self> {
        req.context()
            .extension::<T>()
            .map(Self)
            .ok_or(ExtractError::ExtensionNotFound(std::any::type_name::<T>()))
    }
}
