//! Application assembly.
//!
//! [`WeixinApp`] ties the pieces together at startup: it loads and validates
//! the configuration, sets up logging, builds the shared [`Context`] and
//! freezes the [`Router`] into a [`Dispatcher`].
//!
//! ```rust,ignore
//! let app = WeixinApp::builder()
//!     .profile("production")
//!     .entry("welcome", "thanks for following!")
//!     .extension(db_pool)
//!     .codec(XmlCodec::new())
//!     .renderer(XmlRenderer::new())
//!     .router(router)
//!     .build()?;
//!
//! // inside the HTTP handler
//! let body = app.dispatch(&request_body).await?;
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use weixin_core::{Context, ContextBuilder, PayloadCodec, ReplyRenderer, Storage};
use weixin_framework::{DispatchResult, Dispatcher, Router};

use crate::config::{ConfigLoader, WeixinConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// A configured application: the validated configuration and the dispatcher
/// built from it.
#[derive(Debug, Clone)]
pub struct WeixinApp {
    config: WeixinConfig,
    dispatcher: Dispatcher,
}

impl WeixinApp {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn config(&self) -> &WeixinConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns the dispatcher, e.g. to hand it to a tower stack.
    pub fn into_dispatcher(self) -> Dispatcher {
        self.dispatcher
    }

    /// Handles one raw payload. See [`Dispatcher::dispatch`].
    pub async fn dispatch(&self, payload: &str) -> DispatchResult<Option<String>> {
        self.dispatcher.dispatch(payload).await
    }
}

/// Builder for [`WeixinApp`].
pub struct AppBuilder {
    config_loader: ConfigLoader,
    config: Option<WeixinConfig>,
    context: ContextBuilder,
    entries: HashMap<String, Value>,
    codec: Option<Arc<dyn PayloadCodec>>,
    renderer: Option<Arc<dyn ReplyRenderer>>,
    router: Router,
    init_logging: bool,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            config: None,
            context: Context::builder(),
            entries: HashMap::new(),
            codec: None,
            renderer: None,
            router: Router::new(),
            init_logging: true,
        }
    }

    // ─── Configuration sources ──────────────────────────────────────────────

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Overrides a single configuration value, e.g. `.set("app.token", "xxx")`.
    pub fn set(mut self, key: &str, value: impl Serialize) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Uses an already loaded configuration instead of loading one.
    pub fn config(mut self, config: WeixinConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Skips installing the global tracing subscriber.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    // ─── Context ────────────────────────────────────────────────────────────

    /// Adds a context entry. Entries set here win over `[context]` entries
    /// from the configuration.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn extension<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.context = self.context.extension(value);
        self
    }

    /// Sets the storage backend. Defaults to an in-memory store.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.context = self.context.storage(storage);
        self
    }

    // ─── Collaborators ──────────────────────────────────────────────────────

    pub fn codec(mut self, codec: impl PayloadCodec) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn renderer(mut self, renderer: impl ReplyRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Loads and validates the configuration, then assembles the app.
    pub fn build(self) -> RuntimeResult<WeixinApp> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let codec = self.codec.ok_or(RuntimeError::MissingCodec)?;
        let renderer = self.renderer.ok_or(RuntimeError::MissingRenderer)?;

        if !config.app.has_encryption_key() {
            warn!("No encoding_aes_key configured, encrypted messages will not be answered");
        }
        if !self.context.has_storage() {
            info!("No storage configured, using in-memory storage");
        }

        let context = self
            .context
            .credentials(config.app.clone())
            .entries(config.context.clone())
            .entries(self.entries)
            .build();

        info!(
            app_id = config.app.app_id.as_deref().unwrap_or_default(),
            routes = self.router.registry().len(),
            "Application initialized"
        );

        let dispatcher =
            Dispatcher::from_parts(self.router, Arc::new(context), codec, renderer);

        Ok(WeixinApp { config, dispatcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use weixin_core::{Credentials, DecodeError, MemoryStorage, Message, RenderError, Reply};

    fn json_codec(payload: &str) -> Result<Message, DecodeError> {
        serde_json::from_str(payload).map_err(|e| DecodeError::Malformed(e.to_string()))
    }

    struct TextRenderer;

    impl ReplyRenderer for TextRenderer {
        fn render(
            &self,
            reply: Reply,
            _message: &Message,
            _ctx: &Context,
        ) -> Result<String, RenderError> {
            reply
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| RenderError::Unsupported("payload".into()))
        }
    }

    fn config() -> WeixinConfig {
        WeixinConfig {
            app: Credentials {
                token: Some("token".into()),
                app_id: Some("wx_test".into()),
                ..Default::default()
            },
            context: HashMap::from([
                ("welcome".to_string(), Value::from("from config")),
                ("shop".to_string(), Value::from("from config")),
            ]),
            ..Default::default()
        }
    }

    fn builder() -> AppBuilder {
        WeixinApp::builder()
            .config(config())
            .without_logging()
            .codec(json_codec)
            .renderer(TextRenderer)
    }

    #[tokio::test]
    async fn test_build_and_dispatch() {
        let router = Router::new().subscribe(|ctx: Arc<Context>| async move {
            ctx.get_str("welcome").map(str::to_string)
        });
        let app = builder().router(router).build().unwrap();

        let body = app
            .dispatch(r#"{"MsgType":"event","Event":"subscribe"}"#)
            .await
            .unwrap();
        assert_eq!(body.as_deref(), Some("from config"));
    }

    #[test]
    fn test_context_wiring() {
        let app = builder().entry("shop", "from code").build().unwrap();
        let ctx = app.dispatcher().context();

        assert_eq!(ctx.get_str("welcome"), Some("from config"));
        assert_eq!(ctx.get_str("shop"), Some("from code"));
        assert_eq!(ctx.credentials().app_id.as_deref(), Some("wx_test"));
        assert_eq!(app.config().app.token.as_deref(), Some("token"));
    }

    #[test]
    fn test_injected_storage_is_used() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("k", Value::from(1), None).unwrap();

        let app = builder().storage(Arc::clone(&storage)).build().unwrap();
        let ctx = app.dispatcher().context();
        assert_eq!(ctx.storage().get("k").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = builder().config(WeixinConfig::default()).build();
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_missing_collaborators() {
        let result = WeixinApp::builder()
            .config(config())
            .without_logging()
            .renderer(TextRenderer)
            .build();
        assert!(matches!(result, Err(RuntimeError::MissingCodec)));

        let result = WeixinApp::builder()
            .config(config())
            .without_logging()
            .codec(json_codec)
            .build();
        assert!(matches!(result, Err(RuntimeError::MissingRenderer)));
    }
}
