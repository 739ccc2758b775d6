//! Message dispatcher for the weixin framework.
//!
//! The [`Dispatcher`] owns the frozen [`Registry`] and runs one inbound
//! payload through the whole pipeline:
//!
//! 1. decode the payload with the [`PayloadCodec`]
//! 2. derive candidate routing keys with the [`KeyResolver`]
//! 3. resolve and invoke the primary handler
//! 4. invoke the finish hook (`_ON_FINISH_`)
//! 5. render the primary handler's reply with the [`ReplyRenderer`]
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(router, codec, renderer);
//! let body = dispatcher.dispatch(&payload).await?;
//! ```
//!
//! A message whose type cannot be determined (for example an encrypted body
//! the codec could not decrypt) gets no reply and no handler runs for it.

use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, Level, debug, span, warn};

use weixin_core::{Context, Message, PayloadCodec, Reply, ReplyRenderer, RoutingKey};

use crate::error::{DispatchError, DispatchResult};
use crate::registry::Registry;
use crate::request::Request;
use crate::resolver::KeyResolver;

/// The central message dispatcher.
///
/// Cheap to clone: every clone shares the same registry, context, codec and
/// renderer. The dispatcher holds no per-message state and can be called
/// from any number of tasks at once.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    context: Arc<Context>,
    codec: Arc<dyn PayloadCodec>,
    renderer: Arc<dyn ReplyRenderer>,
    resolver: KeyResolver,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry` with a default [`Context`].
    pub fn new(
        registry: impl Into<Registry>,
        codec: impl PayloadCodec,
        renderer: impl ReplyRenderer,
    ) -> Self {
        Self::from_parts(
            registry,
            Arc::new(Context::default()),
            Arc::new(codec),
            Arc::new(renderer),
        )
    }

    /// Creates a dispatcher from already shared parts.
    pub fn from_parts(
        registry: impl Into<Registry>,
        context: Arc<Context>,
        codec: Arc<dyn PayloadCodec>,
        renderer: Arc<dyn ReplyRenderer>,
    ) -> Self {
        Self {
            registry: Arc::new(registry.into()),
            context,
            codec,
            renderer,
            resolver: KeyResolver::new(),
        }
    }

    /// Replaces the context shared by all dispatches.
    pub fn with_context(mut self, context: impl Into<Arc<Context>>) -> Self {
        self.context = context.into();
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Handles one raw payload and returns the rendered reply body, if any.
    ///
    /// Payloads that fail to decode are logged and answered with no reply.
    pub async fn dispatch(&self, payload: &str) -> DispatchResult<Option<String>> {
        let message = match self.codec.decode(payload, &self.context) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to decode payload, not replying");
                return Ok(None);
            }
        };

        let Some(reply) = self.dispatch_message(message.clone()).await? else {
            return Ok(None);
        };

        let body = self.renderer.render(reply, &message, &self.context)?;
        Ok(Some(body))
    }

    /// Routes an already decoded message and returns the primary handler's
    /// reply without rendering it.
    pub async fn dispatch_message(&self, message: Message) -> DispatchResult<Option<Reply>> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            msg_type = message.msg_type().unwrap_or_default(),
            event = message.event_name().unwrap_or_default(),
        );
        self.route(message).instrument(span).await
    }

    async fn route(&self, message: Message) -> DispatchResult<Option<Reply>> {
        let keys = self.resolver.candidate_keys(&message);
        if keys.is_empty() {
            debug!("Message has no type, not routing");
            return Ok(None);
        }

        let req = Arc::new(Request::new(message, Arc::clone(&self.context)));

        let reply = self
            .registry
            .resolve(&keys)
            .call(Arc::clone(&req))
            .await
            .map_err(DispatchError::Handler)?;

        self.finish(req).await.map_err(DispatchError::FinishHook)?;

        debug!(replied = reply.is_some(), "Message handled");
        Ok(reply)
    }

    /// Runs the finish hook, discarding its reply.
    async fn finish(&self, req: Arc<Request>) -> Result<(), tower::BoxError> {
        let Some(hook) = self.registry.lookup(&RoutingKey::finish_hook()) else {
            return Ok(());
        };
        hook.call(req).await?;
        Ok(())
    }
}

impl Service<String> for Dispatcher {
    type Response = Option<String>;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<Option<String>>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, payload: String) -> Self::Future {
        let this = self.clone();
        async move { this.dispatch(&payload).await }.boxed()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
