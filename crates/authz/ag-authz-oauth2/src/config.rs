//! OAuth2 adapter configuration.

use std::time::Duration;

/// Settings for an [`OAuth2Adapter`](crate::OAuth2Adapter).
///
/// Only the client id is required up front. Endpoints are optional here and
/// checked by the operation that needs them, so a config without a
/// `revoke_endpoint` works fine until `revoke()` is called.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// OAuth2 client identifier registered with the provider.
    pub client_id: String,

    /// Where the provider sends the user back. The token arrives in this
    /// URL's fragment.
    pub redirect_url: Option<String>,

    /// The provider's authorization endpoint.
    pub auth_endpoint: Option<String>,

    /// Token introspection endpoint. Setting it turns on the audience
    /// check during verification; without it a returned token is accepted
    /// on the strength of the state check alone.
    pub token_validation_endpoint: Option<String>,

    /// Revocation endpoint used by `revoke()`.
    pub revoke_endpoint: Option<String>,

    /// Space-delimited scopes to request.
    pub scopes: String,

    /// Value sent as `approval_prompt`.
    pub prompt: String,

    /// Pinned anti-forgery state. `None` means a fresh random state per
    /// flow. Pin one only when a redirect page has to know the value
    /// across reloads.
    pub state: Option<String>,

    /// How often the popup's location is polled.
    pub poll_interval: Duration,

    /// How long a popup flow may run before it fails with a timeout.
    pub flow_timeout: Duration,

    /// Timeout applied to each HTTP request.
    pub http_timeout: Duration,
}

impl OAuth2Config {
    /// Create a configuration with defaults for everything but the client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_url: None,
            auth_endpoint: None,
            token_validation_endpoint: None,
            revoke_endpoint: None,
            scopes: String::new(),
            prompt: "auto".to_string(),
            state: None,
            poll_interval: Duration::from_millis(500),
            flow_timeout: Duration::from_secs(300), // 5 minutes
            http_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    pub fn with_auth_endpoint(mut self, auth_endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = Some(auth_endpoint.into());
        self
    }

    pub fn with_token_validation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_validation_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_revoke_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.revoke_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_flow_timeout(mut self, timeout: Duration) -> Self {
        self.flow_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}
