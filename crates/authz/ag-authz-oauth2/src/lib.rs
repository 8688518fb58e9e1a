//! OAuth2 implicit-grant adapter.
//!
//! Drives the browser-side "implicit" OAuth2 flow: open a window at the
//! provider's authorization endpoint, poll it until the redirect comes back
//! with a token in the URL fragment, verify the anti-forgery state (and,
//! when an introspection endpoint is configured, the token's audience),
//! persist the verified token, and attach it to calls against protected
//! services.
//!
//! Browser and storage are trait collaborators from `ag-authz-core`, so the
//! same adapter runs against a real webview, a system browser, or the
//! scripted fakes the tests use.
//!
//! ```no_run
//! use ag_authz_oauth2::{InMemoryKeyValueStore, OAuth2Adapter, OAuth2Config};
//! use std::sync::Arc;
//!
//! # async fn run(browser: Arc<dyn ag_authz_oauth2::Browser>) -> ag_authz_oauth2::OAuth2Result<()> {
//! let config = OAuth2Config::new("client-123")
//!     .with_auth_endpoint("https://accounts.google.com/o/oauth2/auth")
//!     .with_redirect_url("http://localhost:8000/redirector.html")
//!     .with_token_validation_endpoint("https://www.googleapis.com/oauth2/v1/tokeninfo")
//!     .with_scopes("https://www.googleapis.com/auth/userinfo.profile");
//!
//! let adapter = OAuth2Adapter::new(config, Arc::new(InMemoryKeyValueStore::new()), browser);
//! let grant = adapter.authorize().await?;
//! println!("access token: {}", grant.access_token);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod config;
mod error;
mod fragment;
mod popup;
mod store;
mod types;


pub use adapter::OAuth2Adapter;
pub use config::OAuth2Config;
pub use error::{OAuth2Error, OAuth2Result};
pub use fragment::{AuthorizationResult, parse_fragment};
pub use store::{StoredToken, TokenStore};
pub use types::TokenInfo;

// Re-export common types for convenience
pub use ag_authz_core::{
    AdapterKind, Authorizer, AuthzError, AuthzResult, Browser, BrowserWindow, Grant,
    InMemoryKeyValueStore, KeyValueStore,
};
