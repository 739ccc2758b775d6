//! The decoded inbound message record.
//!
//! A [`Message`] is produced by a [`PayloadCodec`](crate::PayloadCodec) from
//! the raw webhook body. The core only reads a handful of fields from it
//! (`MsgType`, `Event`, `EventKey`, `Content`); everything else is kept in
//! [`Message::fields`] for handlers that need it.
//!
//! Field names follow the platform's PascalCase names so any serde-capable
//! decoder can produce a `Message` directly:
//!
//! ```rust,ignore
//! let message: Message = serde_json::from_value(json!({
//!     "ToUserName": "gh_123",
//!     "FromUserName": "o_user",
//!     "MsgType": "text",
//!     "Content": "hello",
//! }))?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known values of the `MsgType` field.
pub mod msg_type {
    pub const TEXT: &str = "text";
    pub const IMAGE: &str = "image";
    pub const VOICE: &str = "voice";
    pub const VIDEO: &str = "video";
    pub const SHORTVIDEO: &str = "shortvideo";
    pub const LOCATION: &str = "location";
    pub const LINK: &str = "link";
    /// Event notifications; these are further routed by the `Event` field.
    pub const EVENT: &str = "event";
}

/// Well-known values of the `Event` field.
pub mod event {
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    pub const LOCATION: &str = "location";
    pub const VIEW: &str = "view";
    /// Menu click; carries the menu key in `EventKey`.
    pub const CLICK: &str = "click";
    /// Parametrised QR-code scan; carries the scene in `EventKey`.
    pub const SCAN: &str = "scan";
}

/// An inbound message as delivered by the platform.
///
/// Every field is optional: an encrypted body that could not be decrypted
/// decodes into a message with no `MsgType`, which the dispatcher treats as
/// "nothing to route".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,

    /// Text body of `text` messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Event name of `event` messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Discriminating key of keyed events (menu key, QR scene).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_key: Option<String>,

    /// Any field the core does not model explicitly (`PicUrl`, `MediaId`,
    /// `Location_X`, ...).
    #[serde(flatten, default)]
    pub fields: BTreeMap<String, Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Message {
    /// Creates a message of the given type with no other fields set.
    pub fn of_type(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: Some(msg_type.into()),
            ..Default::default()
        }
    }

    /// Creates a `text` message with the given content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::of_type(msg_type::TEXT)
        }
    }

    /// Creates an `event` message with the given event name.
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            event: Some(name.into()),
            ..Self::of_type(msg_type::EVENT)
        }
    }

    /// Sets the event key.
    pub fn with_event_key(mut self, key: impl Into<String>) -> Self {
        self.event_key = Some(key.into());
        self
    }

    /// Sets sender and recipient.
    pub fn with_users(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_user_name = Some(from.into());
        self.to_user_name = Some(to.into());
        self
    }

    /// Sets an extra field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the message type, or `None` when absent or empty.
    pub fn msg_type(&self) -> Option<&str> {
        non_empty(&self.msg_type)
    }

    /// Returns the event name, or `None` when absent or empty.
    pub fn event_name(&self) -> Option<&str> {
        non_empty(&self.event)
    }

    /// Returns the event key, or `None` when absent or empty.
    pub fn event_key(&self) -> Option<&str> {
        non_empty(&self.event_key)
    }

    /// Returns the text content, or `None` when absent.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the sender's open id.
    pub fn sender(&self) -> Option<&str> {
        non_empty(&self.from_user_name)
    }

    /// Returns the recipient (the official account id).
    pub fn recipient(&self) -> Option<&str> {
        non_empty(&self.to_user_name)
    }

    /// Returns `true` if this is an event notification.
    pub fn is_event(&self) -> bool {
        self.msg_type()
            .is_some_and(|t| t.eq_ignore_ascii_case(msg_type::EVENT))
    }

    /// Returns an extra field by its platform name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_platform_fields() {
        let message: Message = serde_json::from_value(json!({
            "ToUserName": "gh_123",
            "FromUserName": "o_user",
            "CreateTime": 1348831860,
            "MsgType": "image",
            "PicUrl": "http://example.com/a.png",
            "MediaId": "m1",
        }))
        .unwrap();

        assert_eq!(message.msg_type(), Some("image"));
        assert_eq!(message.sender(), Some("o_user"));
        assert_eq!(message.recipient(), Some("gh_123"));
        assert_eq!(message.create_time, Some(1348831860));
        assert_eq!(message.field("MediaId"), Some(&json!("m1")));
        assert!(message.content().is_none());
    }

    #[test]
    fn test_empty_strings_read_as_absent() {
        let message = Message::event("CLICK").with_event_key("");
        assert_eq!(message.event_key(), None);

        let message = Message::of_type("");
        assert_eq!(message.msg_type(), None);
        assert!(!message.is_event());
    }

    #[test]
    fn test_is_event_ignores_case() {
        assert!(Message::of_type("EVENT").is_event());
        assert!(Message::event("subscribe").is_event());
        assert!(!Message::text("hi").is_event());
    }
}
