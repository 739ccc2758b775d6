//! Routing-key derivation from message shape.
//!
//! A message maps to an ordered list of candidate [`RoutingKey`]s, most
//! specific first. The registry tries them in order and falls back to its
//! default handler when none is registered.
//!
//! | message                                   | candidates                           |
//! |-------------------------------------------|--------------------------------------|
//! | `MsgType=text`                            | `TEXT`                               |
//! | `MsgType=event, Event=subscribe`          | `EVENT_SUBSCRIBE`                    |
//! | `MsgType=event, Event=CLICK, EventKey=M1` | `EVENT_CLICK_M1`, `EVENT_CLICK`      |
//! | `MsgType=event, Event=VIEW, EventKey=url` | `EVENT_VIEW`                         |
//! | no `MsgType`                              | *(none)*                             |

use weixin_core::{Message, RoutingKey, event};

/// Event kinds whose `EventKey` selects a more specific handler.
const KEYED_EVENTS: [&str; 2] = [event::CLICK, event::SCAN];

/// Derives candidate routing keys from messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyResolver;

impl KeyResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the candidate keys for `message`, most specific first.
    ///
    /// An empty list means the message has no usable type (typically an
    /// encrypted body that could not be decrypted) and must not be routed.
    pub fn candidate_keys(&self, message: &Message) -> Vec<RoutingKey> {
        let Some(mtype) = message.msg_type() else {
            return Vec::new();
        };

        let Some(event) = message.event_name().filter(|_| message.is_event()) else {
            return vec![RoutingKey::for_type(mtype)];
        };

        let main_key = RoutingKey::for_event(event);
        match message.event_key() {
            Some(key) if is_keyed_event(event) => {
                vec![RoutingKey::for_event_key(event, key), main_key]
            }
            _ => vec![main_key],
        }
    }
}

fn is_keyed_event(event: &str) -> bool {
    let event = event.to_uppercase();
    KEYED_EVENTS.iter().any(|k| k.to_uppercase() == event)
}
