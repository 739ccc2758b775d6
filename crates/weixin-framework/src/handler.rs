//! Handler system for the weixin framework.
//!
//! Handlers are plain async functions. The [`Handler`] trait is implemented
//! for every async function whose parameters implement [`FromRequest`] and
//! whose return type implements [`HandlerResponse`], the same way Axum adapts
//! its handlers.
//!
//! ```rust,ignore
//! // No parameters, no reply body
//! async fn ignore() {}
//!
//! // Reply with text
//! async fn welcome() -> &'static str {
//!     "thanks for following!"
//! }
//!
//! // Extract the content, fail through `Result`
//! async fn echo(Content(text): Content) -> anyhow::Result<String> {
//!     Ok(text)
//! }
//! ```
//!
//! Registered handlers are stored type-erased as [`BoxedHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tower::BoxError;

use weixin_core::Reply;

use crate::extractor::FromRequest;
use crate::request::Request;

/// What a handler produces: an optional reply body, or an error for the
/// transport to deal with.
pub type HandlerResult = Result<Option<Reply>, BoxError>;

// ============================================================================
// HandlerResponse - Convert handler return values
// ============================================================================

/// A trait for types that can be returned from handlers.
pub trait HandlerResponse: Send + 'static {
    fn into_result(self) -> HandlerResult;
}

/// `()` - no reply body.
impl HandlerResponse for () {
    fn into_result(self) -> HandlerResult {
        Ok(None)
    }
}

impl HandlerResponse for Reply {
    fn into_result(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl HandlerResponse for String {
    fn into_result(self) -> HandlerResult {
        Ok(Some(Reply::Text(self)))
    }
}

impl HandlerResponse for &'static str {
    fn into_result(self) -> HandlerResult {
        Ok(Some(Reply::from(self)))
    }
}

impl HandlerResponse for serde_json::Value {
    fn into_result(self) -> HandlerResult {
        Ok(Some(Reply::Payload(self)))
    }
}

/// `None` means no reply body.
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    fn into_result(self) -> HandlerResult {
        match self {
            Some(t) => t.into_result(),
            None => Ok(None),
        }
    }
}

/// `Err` is handed back to the dispatcher untouched.
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: Into<BoxError> + Send + 'static,
{
    fn into_result(self) -> HandlerResult {
        match self {
            Ok(t) => t.into_result(),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for message handlers.
///
/// Automatically implemented for async functions that take up to 8
/// [`FromRequest`] parameters and return a [`HandlerResponse`].
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given request.
    async fn call(self, req: Arc<Request>) -> HandlerResult;
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in the registry
// ============================================================================

/// A type-erased handler that can be stored in collections.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<Request>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |req| f.clone().call(req))
}

/// A handler that does nothing and produces no reply.
///
/// Installed as the registry default, the filter-chain default and the
/// finish hook until the application replaces them.
pub fn noop() -> BoxedHandler {
    into_handler(|| async {})
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

/// Macro to generate Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse,
            $( $ty: FromRequest + Send + 'static, )*
        {
            async fn call(self, req: Arc<Request>) -> HandlerResult {
                $(
                    let $ty = $ty::from_request(&req)?;
                )*

                (self)($($ty,)*).await.into_result()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Content;
    use weixin_core::{Context, Message};

    fn request(message: Message) -> Arc<Request> {
        Arc::new(Request::new(message, Arc::new(Context::default())))
    }

    #[tokio::test]
    async fn test_return_types_map_to_replies() {
        let unit = into_handler(|| async {});
        assert_eq!(unit(request(Message::text("a"))).await.unwrap(), None);

        let text = into_handler(|| async { "hi" });
        assert_eq!(
            text(request(Message::text("a"))).await.unwrap(),
            Some(Reply::text("hi"))
        );

        let none = into_handler(|| async { Option::<String>::None });
        assert_eq!(none(request(Message::text("a"))).await.unwrap(), None);

        let payload = into_handler(|| async { serde_json::json!({ "articles": [] }) });
        assert!(matches!(
            payload(request(Message::text("a"))).await.unwrap(),
            Some(Reply::Payload(_))
        ));
    }

    #[tokio::test]
    async fn test_extractors_feed_parameters() {
        let echo = into_handler(|Content(text): Content| async move { text });
        assert_eq!(
            echo(request(Message::text("ping"))).await.unwrap(),
            Some(Reply::text("ping"))
        );
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let failing = into_handler(|| async { Err::<String, _>("boom") });
        let err = failing(request(Message::text("a"))).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        // Extraction failure surfaces as the handler's error
        let echo = into_handler(|Content(text): Content| async move { text });
        assert!(echo(request(Message::of_type("image"))).await.is_err());
    }

    #[tokio::test]
    async fn test_noop_produces_no_reply() {
        assert_eq!(noop()(request(Message::default())).await.unwrap(), None);
    }
}
