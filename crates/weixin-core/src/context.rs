//! Ambient configuration shared by every handler.
//!
//! One [`Context`] is built at startup and shared behind an `Arc` by all
//! dispatches. It carries:
//!
//! - the application [`Credentials`],
//! - arbitrary named entries (`key → JSON value`) supplied by the integrator,
//! - type-keyed extensions for handles that are not data (a database pool,
//!   an HTTP client, ...),
//! - the [`Storage`] handle.
//!
//! The dispatch core only reads from it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{MemoryStorage, Storage};

/// Official-account credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Token used for signature verification.
    pub token: Option<String>,
    /// Application id.
    pub app_id: Option<String>,
    /// Application secret, used to obtain access tokens.
    pub app_secret: Option<String>,
    /// Message encryption key; when absent, encrypted payloads cannot be decoded.
    pub encoding_aes_key: Option<String>,
}

impl Credentials {
    /// Returns `true` if encrypted payloads can be handled.
    pub fn has_encryption_key(&self) -> bool {
        self.encoding_aes_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(v: &Option<String>) -> Option<&'static str> {
            v.as_ref().map(|_| "***")
        }

        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("app_id", &self.app_id)
            .field("app_secret", &redact(&self.app_secret))
            .field("encoding_aes_key", &redact(&self.encoding_aes_key))
            .finish()
    }
}

/// Shared, read-only configuration handed to every handler.
pub struct Context {
    credentials: Credentials,
    entries: HashMap<String, Value>,
    extensions: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    storage: Arc<dyn Storage>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a named entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns a named entry deserialized into `T`.
    ///
    /// Returns `None` if the entry is missing or has the wrong shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|v| T::deserialize(v).ok())
    }

    /// Returns a named entry as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Returns the extension of type `T`, if one was installed.
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|ext| Arc::clone(ext).downcast::<T>().ok())
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("credentials", &self.credentials)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .field("extension_count", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Context`].
///
/// ```rust,ignore
/// let ctx = Context::builder()
///     .credentials(credentials)
///     .entry("welcome", "hello!")
///     .extension(db_pool)
///     .storage(Arc::new(MemoryStorage::new()))
///     .build();
/// ```
#[derive(Default)]
pub struct ContextBuilder {
    credentials: Credentials,
    entries: HashMap<String, Value>,
    extensions: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    storage: Option<Arc<dyn Storage>>,
}

impl ContextBuilder {
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Adds a named entry, replacing any previous entry with the same name.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Adds all entries from `entries`.
    pub fn entries(mut self, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Installs an extension. Only one value per type is kept.
    pub fn extension<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Returns `true` if a storage handle was supplied.
    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Builds the context, falling back to [`MemoryStorage`] when no storage
    /// was supplied.
    pub fn build(self) -> Context {
        Context {
            credentials: self.credentials,
            entries: self.entries,
            extensions: self.extensions,
            storage: self
                .storage
                .unwrap_or_else(|| Arc::new(MemoryStorage::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct DbPool {
        url: &'static str,
    }

    #[test]
    fn test_entries_and_typed_lookup() {
        let ctx = Context::builder()
            .entry("welcome", "hello")
            .entry("limits", json!({ "max": 5 }))
            .build();

        assert_eq!(ctx.get_str("welcome"), Some("hello"));
        assert_eq!(ctx.get("limits"), Some(&json!({ "max": 5 })));
        assert_eq!(ctx.get_as::<u32>("welcome"), None);
        assert!(ctx.get("missing").is_none());
    }

    #[test]
    fn test_extensions_by_type() {
        let ctx = Context::builder()
            .extension(DbPool { url: "sqlite://x" })
            .build();

        assert_eq!(ctx.extension::<DbPool>().unwrap().url, "sqlite://x");
        assert!(ctx.extension::<String>().is_none());
    }

    #[test]
    fn test_default_storage_is_memory() {
        let ctx = Context::default();
        ctx.storage().set("k", json!(1), None).unwrap();
        assert_eq!(ctx.storage().get("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials {
            token: Some("secret-token".into()),
            app_id: Some("wx123".into()),
            ..Default::default()
        };
        let out = format!("{creds:?}");
        assert!(out.contains("wx123"));
        assert!(!out.contains("secret-token"));
        assert!(!creds.has_encryption_key());
    }
}
