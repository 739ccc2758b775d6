//! Declarative handler registration.
//!
//! A [`Router`] is the startup-time registration surface. Each method takes a
//! handler, binds it in the underlying [`Registry`] and hands the router back,
//! so an application's routes read as a single chain:
//!
//! ```rust,ignore
//! let router = Router::new()
//!     .subscribe(welcome)
//!     .click(menu_fallback)
//!     .click_key("V1001_TODAY_MUSIC", today_music)
//!     .filter(["签到", "sign"], sign_in)?
//!     .filter("^help", help)?
//!     .filter_default(echo)
//!     .fallback(unsupported)
//!     .on_finish(audit_log);
//! ```
//!
//! Registration is last-write-wins per routing key. Once the router is turned
//! into a [`Dispatcher`](crate::Dispatcher), the routes are frozen.

use weixin_core::{RoutingKey, event, msg_type};

use crate::error::FilterError;
use crate::filter::FilterPattern;
use crate::handler::{Handler, into_handler};
use crate::registry::Registry;

/// Builder-style registration surface over a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct Router {
    registry: Registry,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a handler to a message type (`text`, `image`, `event`, ...).
    pub fn on_type<H, T>(mut self, msg_type: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry
            .register(RoutingKey::for_type(msg_type), into_handler(handler));
        self
    }

    /// Binds a handler to an event (`subscribe`, `click`, ...).
    pub fn on_event<H, T>(mut self, event: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry
            .register(RoutingKey::for_event(event), into_handler(handler));
        self
    }

    /// Binds a handler to one key of a keyed event.
    ///
    /// Only `click` and `scan` events are routed by key; for any other event
    /// this binding is never selected.
    pub fn on_event_key<H, T>(mut self, event: &str, key: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry
            .register(RoutingKey::for_event_key(event, key), into_handler(handler));
        self
    }

    /// Appends a text filter. See [`FilterPattern`] for accepted patterns.
    ///
    /// The first filter takes over the `text` route.
    pub fn filter<P, H, T>(mut self, pattern: P, handler: H) -> Result<Self, FilterError>
    where
        P: Into<FilterPattern>,
        H: Handler<T>,
        T: 'static,
    {
        self.registry.add_filter(pattern, into_handler(handler))?;
        Ok(self)
    }

    /// Handles text that matches no filter.
    pub fn filter_default<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry.set_filter_default(into_handler(handler));
        self
    }

    /// Handles messages no route matches.
    pub fn fallback<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry.set_default(into_handler(handler));
        self
    }

    /// Runs after the primary handler of every routed message. Its reply is
    /// discarded.
    pub fn on_finish<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.registry
            .register(RoutingKey::finish_hook(), into_handler(handler));
        self
    }

    // ─── Message-type shorthands ────────────────────────────────────────────

    /// Handles `text` messages. Replaced by the filter chain if filters are
    /// added afterwards.
    pub fn text<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::TEXT, handler)
    }

    pub fn image<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::IMAGE, handler)
    }

    pub fn voice<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::VOICE, handler)
    }

    pub fn video<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::VIDEO, handler)
    }

    pub fn shortvideo<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::SHORTVIDEO, handler)
    }

    pub fn location<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::LOCATION, handler)
    }

    pub fn link<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_type(msg_type::LINK, handler)
    }

    // ─── Event shorthands ───────────────────────────────────────────────────

    pub fn subscribe<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::SUBSCRIBE, handler)
    }

    pub fn unsubscribe<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::UNSUBSCRIBE, handler)
    }

    /// Handles location-report events (distinct from `location` messages).
    pub fn location_event<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::LOCATION, handler)
    }

    pub fn view<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::VIEW, handler)
    }

    /// Handles menu clicks whose key has no dedicated handler.
    pub fn click<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::CLICK, handler)
    }

    /// Handles menu clicks with the given key. Takes precedence over [`click`](Self::click).
    pub fn click_key<H: Handler<T>, T: 'static>(self, key: &str, handler: H) -> Self {
        self.on_event_key(event::CLICK, key, handler)
    }

    /// Handles QR-code scans whose scene has no dedicated handler.
    pub fn scan<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on_event(event::SCAN, handler)
    }

    /// Handles QR-code scans of the given scene. Takes precedence over [`scan`](Self::scan).
    pub fn scan_scene<H: Handler<T>, T: 'static>(self, scene: &str, handler: H) -> Self {
        self.on_event_key(event::SCAN, scene, handler)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}

impl From<Router> for Registry {
    fn from(router: Router) -> Self {
        router.into_registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn nothing() {}

    #[test]
    fn test_shorthands_bind_canonical_keys() {
        let router = Router::new()
            .text(nothing)
            .image(nothing)
            .shortvideo(nothing)
            .subscribe(nothing)
            .location_event(nothing)
            .click(nothing)
            .click_key("v1001", nothing)
            .scan_scene("123", nothing)
            .on_finish(nothing);

        let registry = router.registry();
        for key in [
            "TEXT",
            "IMAGE",
            "SHORTVIDEO",
            "EVENT_SUBSCRIBE",
            "EVENT_LOCATION",
            "EVENT_CLICK",
            "EVENT_CLICK_V1001",
            "EVENT_SCAN_123",
            "_ON_FINISH_",
        ] {
            assert!(registry.contains(&RoutingKey::new(key)), "missing {key}");
        }
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_filter_registration_errors_surface() {
        let result = Router::new().filter("(", nothing);
        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
    }

    #[test]
    fn test_filter_takes_over_text_route() {
        let registry = Router::new()
            .text(nothing)
            .filter(["hi"], nothing)
            .unwrap()
            .into_registry();

        assert!(registry
            .resolve(&[RoutingKey::new("text")])
            .is_filter_chain());
    }
}
