//! Handler registry keyed by canonical routing keys.
//!
//! The registry maps each [`RoutingKey`] to at most one handler and owns the
//! [`FilterChain`] for text messages. Lookups never fail: a miss resolves to
//! the registry's default handler, which produces no reply unless replaced.
//!
//! The registry is populated once at startup (normally through a
//! [`Router`](crate::Router)) and shared read-only by all dispatches
//! afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use weixin_core::{RoutingKey, msg_type};

use crate::error::FilterError;
use crate::filter::{FilterChain, FilterPattern};
use crate::handler::{BoxedHandler, HandlerResult, noop};
use crate::request::Request;

/// What a routing key is bound to.
#[derive(Clone)]
enum Route {
    Handler(BoxedHandler),
    /// Re-dispatch through the registry's filter chain.
    Filters,
}

/// A resolved handler, ready to be called.
#[derive(Clone, Copy)]
pub enum Endpoint<'a> {
    Handler(&'a BoxedHandler),
    Filters(&'a FilterChain),
}

impl<'a> Endpoint<'a> {
    pub async fn call(self, req: Arc<Request>) -> HandlerResult {
        match self {
            Self::Handler(handler) => handler(req).await,
            Self::Filters(chain) => chain.dispatch(req).await,
        }
    }

    pub fn is_filter_chain(self) -> bool {
        matches!(self, Self::Filters(_))
    }
}

/// Mapping from routing key to handler, with a global default.
#[derive(Clone)]
pub struct Registry {
    routes: HashMap<RoutingKey, Route>,
    filters: FilterChain,
    filters_installed: bool,
    default: BoxedHandler,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry whose default handler is a no-op.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            filters: FilterChain::new(),
            filters_installed: false,
            default: noop(),
        }
    }

    /// Binds `handler` to `key`, replacing any previous binding.
    pub fn register(&mut self, key: impl Into<RoutingKey>, handler: BoxedHandler) {
        let key = key.into();
        if self.routes.insert(key.clone(), Route::Handler(handler)).is_some() {
            trace!(%key, "Replaced existing handler");
        }
    }

    /// Appends a text filter.
    ///
    /// The first filter binds the `TEXT` key to the filter chain; later
    /// filters only extend the chain.
    pub fn add_filter(
        &mut self,
        pattern: impl Into<FilterPattern>,
        handler: BoxedHandler,
    ) -> Result<(), FilterError> {
        self.filters.push(pattern, handler)?;

        if !self.filters_installed {
            self.routes
                .insert(RoutingKey::for_type(msg_type::TEXT), Route::Filters);
            self.filters_installed = true;
        }
        Ok(())
    }

    /// Replaces the handler used for text that matches no filter.
    pub fn set_filter_default(&mut self, handler: BoxedHandler) {
        self.filters.set_default(handler);
    }

    /// Replaces the handler used when no candidate key is registered.
    pub fn set_default(&mut self, handler: BoxedHandler) {
        self.default = handler;
    }

    /// Returns the endpoint bound to the first registered key in `keys`, or
    /// the default handler if none is registered.
    pub fn resolve(&self, keys: &[RoutingKey]) -> Endpoint<'_> {
        for key in keys {
            if let Some(endpoint) = self.lookup(key) {
                trace!(%key, filters = endpoint.is_filter_chain(), "Resolved handler");
                return endpoint;
            }
        }

        trace!(?keys, "No handler registered, using default");
        Endpoint::Handler(&self.default)
    }

    /// Exact lookup without default fallback.
    pub fn lookup(&self, key: &RoutingKey) -> Option<Endpoint<'_>> {
        self.routes.get(key).map(|route| match route {
            Route::Handler(handler) => Endpoint::Handler(handler),
            Route::Filters => Endpoint::Filters(&self.filters),
        })
    }

    pub fn contains(&self, key: &RoutingKey) -> bool {
        self.routes.contains_key(key)
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Number of bound routing keys.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.routes.keys().map(RoutingKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Registry")
            .field("keys", &keys)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
