//! Core traits and types for client-side authorization adapters.
//!
//! An authorization adapter runs some grant flow against a remote provider,
//! ends up holding an access token, and can then issue authenticated calls
//! on behalf of the application. This crate defines the adapter-facing
//! strategy trait plus the collaborator seams an adapter needs from its
//! host: a browser that can open and observe a popup window, and a durable
//! key/value store for persisting tokens across reloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors surfaced through the adapter-agnostic [`Authorizer`] interface.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Verification of a returned grant failed; the token must not be trusted.
    #[error("authorization rejected: {0}")]
    Rejected(String),

    /// Any other adapter-side failure (transport, configuration, timeout).
    #[error("adapter error: {0}")]
    Adapter(String),

    /// The key/value storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The browser collaborator could not open or observe a window.
    #[error("browser error: {0}")]
    Window(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuthzResult<T> = Result<T, AuthzError>;

/// The closed set of adapter kinds this library ships.
///
/// Adapter selection is explicit construction of the concrete type; this
/// enum only labels an adapter so holders of a `dyn Authorizer` can tell
/// what they are talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKind {
    /// OAuth2 implicit grant (token delivered in the redirect fragment).
    OAuth2,
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::OAuth2 => write!(f, "OAuth2"),
        }
    }
}

/// The outcome of a successfully verified authorization flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    /// The bearer token the provider issued.
    pub access_token: String,

    /// Every parameter the provider returned on the redirect.
    pub params: HashMap<String, String>,

    /// Introspection payload, when a validation endpoint vouched for the
    /// token. `None` means the token was trusted without remote validation.
    pub token_info: Option<serde_json::Value>,
}

/// Strategy interface for authorization adapters.
///
/// Concrete adapters carry richer error types; implementations map them
/// into [`AuthzError`] here so callers can hold a `dyn Authorizer` without
/// caring which grant flow sits behind it.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Which flow this adapter implements.
    fn kind(&self) -> AdapterKind;

    /// Run the interactive flow, driving a popup window to completion.
    async fn authorize(&self) -> AuthzResult<Grant>;

    /// Complete a flow from a redirect string captured out of band.
    async fn validate(&self, redirect: &str) -> AuthzResult<Grant>;

    /// Issue an authenticated GET against a protected resource.
    async fn call_service(&self, service_url: &str) -> AuthzResult<serde_json::Value>;

    /// Ask the provider to revoke the current token.
    async fn revoke(&self) -> AuthzResult<()>;

    /// The current access token, if any flow has established one.
    async fn access_token(&self) -> AuthzResult<Option<String>>;
}

/// A window the browser opened at the provider's authorization endpoint.
///
/// Implementations are expected to be cheap to poll; the adapter reads
/// `location()` on a fixed interval until the provider navigates back to
/// the redirect URL.
pub trait BrowserWindow: Send + Sync {
    /// The window's current location, when the embedder is allowed to read
    /// it. Returns `None` while the window sits on a cross-origin document.
    fn location(&self) -> Option<String>;

    /// Whether the user has closed the window.
    fn is_closed(&self) -> bool;

    /// Close the window. Closing an already-closed window is a no-op.
    fn close(&self);
}

/// The popup collaborator: something that can open a URL in a new window.
pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> AuthzResult<Box<dyn BrowserWindow>>;
}

/// Durable key/value storage collaborator.
///
/// Maps onto whatever the host has: browser local storage behind an IPC
/// bridge, a file, a database table. Values are opaque strings; adapters
/// layer their own encoding on top.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AuthzResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> AuthzResult<()>;
}

/// In-memory [`KeyValueStore`] for tests and single-process embedders.
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> AuthzResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AuthzResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
