//! Canonical routing keys.

use std::borrow::Borrow;
use std::fmt;

/// A case-normalized routing token such as `TEXT`, `EVENT_CLICK` or
/// `EVENT_CLICK_MENU_1`.
///
/// Every constructor uppercases its input, so a key built at registration
/// time and a key built from an inbound message always compare in the same
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutingKey(String);

impl RoutingKey {
    /// Prefix shared by all event keys.
    pub const EVENT_PREFIX: &'static str = "EVENT";

    /// Creates a key from any string, uppercasing it.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().to_uppercase())
    }

    /// Key for a message type, e.g. `text` → `TEXT`.
    pub fn for_type(msg_type: &str) -> Self {
        Self::new(msg_type)
    }

    /// Key for an event, e.g. `subscribe` → `EVENT_SUBSCRIBE`.
    pub fn for_event(event: &str) -> Self {
        Self::new(format!("{}_{event}", Self::EVENT_PREFIX))
    }

    /// Key for a keyed event, e.g. (`click`, `v1001`) → `EVENT_CLICK_V1001`.
    pub fn for_event_key(event: &str, key: &str) -> Self {
        Self::new(format!("{}_{event}_{key}", Self::EVENT_PREFIX))
    }

    /// Key under which the finish hook is registered.
    pub fn finish_hook() -> Self {
        Self::new("_on_finish_")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RoutingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoutingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoutingKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RoutingKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_uppercased() {
        assert_eq!(RoutingKey::new("text").as_str(), "TEXT");
        assert_eq!(RoutingKey::from("ShortVideo"), RoutingKey::new("SHORTVIDEO"));
        assert_eq!(RoutingKey::for_event("subscribe").as_str(), "EVENT_SUBSCRIBE");
        assert_eq!(
            RoutingKey::for_event_key("click", "menu_1").as_str(),
            "EVENT_CLICK_MENU_1"
        );
        assert_eq!(RoutingKey::finish_hook().as_str(), "_ON_FINISH_");
    }

    #[test]
    fn test_borrow_as_str_for_map_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(RoutingKey::new("image"), 1);
        assert_eq!(map.get("IMAGE"), Some(&1));
        assert_eq!(map.get("image"), None);
    }
}
