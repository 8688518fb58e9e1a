//! OAuth2 implicit-grant adapter.

use ag_authz_core::{
    AdapterKind, Authorizer, AuthzError, AuthzResult, Browser, Grant, KeyValueStore,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::OAuth2Config;
use crate::error::{OAuth2Error, OAuth2Result};
use crate::fragment::AuthorizationResult;
use crate::popup;
use crate::store::TokenStore;
use crate::types::TokenInfo;

/// Drives the implicit grant against one provider.
///
/// The adapter owns the flow end to end: building the authorization URL,
/// polling the window the browser collaborator opened, verifying the
/// redirect, persisting the token, and spending it on service calls.
/// Browser and storage are injected so hosts decide what a "window" and
/// "local storage" actually are.
pub struct OAuth2Adapter {
    config: OAuth2Config,
    http_client: Client,
    browser: Arc<dyn Browser>,
    tokens: TokenStore,
    access_token: RwLock<Option<String>>,
    /// State the next verification must see. Refreshed by
    /// `authorization_url()`, pre-seeded from a pinned config state.
    expected_state: RwLock<Option<String>>,
    /// Most recently built authorization URL, echoed in service errors.
    auth_url: RwLock<Option<String>>,
    /// Token for the flow currently polling, replaced on each `authorize()`.
    cancel: RwLock<CancellationToken>,
}

impl OAuth2Adapter {
    pub fn new(
        config: OAuth2Config,
        store: Arc<dyn KeyValueStore>,
        browser: Arc<dyn Browser>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .expect("Failed to create HTTP client");

        let expected_state = config.state.clone();

        Self {
            http_client,
            browser,
            tokens: TokenStore::new(store),
            access_token: RwLock::new(None),
            expected_state: RwLock::new(expected_state),
            auth_url: RwLock::new(None),
            cancel: RwLock::new(CancellationToken::new()),
            config,
        }
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Build the authorization URL and the state embedded in it.
    ///
    /// The returned state becomes the one the next verification expects.
    /// Hosts running the redirect variant navigate a top-level window here
    /// themselves and hand the captured redirect to [`validate`](Self::validate).
    pub async fn authorization_url(&self) -> OAuth2Result<(String, String)> {
        let auth_endpoint = self
            .config
            .auth_endpoint
            .as_deref()
            .ok_or(OAuth2Error::MissingConfiguration("auth_endpoint"))?;
        let redirect_url = self
            .config
            .redirect_url
            .as_deref()
            .ok_or(OAuth2Error::MissingConfiguration("redirect_url"))?;

        let state = match &self.config.state {
            Some(pinned) => pinned.clone(),
            None => Uuid::new_v4().to_string(),
        };

        let mut url = Url::parse(auth_endpoint)?;
        url.query_pairs_mut()
            .append_pair("response_type", "token")
            .append_pair("approval_prompt", &self.config.prompt)
            .append_pair("redirect_uri", redirect_url)
            .append_pair("scope", &self.config.scopes)
            .append_pair("state", &state)
            .append_pair("client_id", &self.config.client_id);

        let auth_url = url.to_string();

        *self.expected_state.write().await = Some(state.clone());
        *self.auth_url.write().await = Some(auth_url.clone());

        debug!(
            "Generated authorization URL for client {}",
            self.config.client_id
        );
        Ok((auth_url, state))
    }

    /// Run the popup flow to completion.
    ///
    /// Opens a window at the authorization URL and polls it until the
    /// provider redirects back with a fragment, the user closes the window,
    /// the flow times out, or [`cancel`](Self::cancel) fires. The redirect
    /// then goes through the same verification as [`validate`](Self::validate).
    pub async fn authorize(&self) -> OAuth2Result<Grant> {
        let (auth_url, _state) = self.authorization_url().await?;

        // Fresh token per flow so an earlier cancel() cannot kill this one.
        let cancel = {
            let mut guard = self.cancel.write().await;
            *guard = CancellationToken::new();
            guard.clone()
        };

        let window = self.browser.open(&auth_url)?;
        info!(
            "Opened authorization window for client {}",
            self.config.client_id
        );

        let location = popup::await_redirect(
            window,
            self.config.poll_interval,
            self.config.flow_timeout,
            cancel,
        )
        .await?;

        self.verify(AuthorizationResult::parse(&location)).await
    }

    /// Complete a flow from a redirect captured outside the adapter.
    pub async fn validate(&self, redirect: &str) -> OAuth2Result<Grant> {
        self.verify(AuthorizationResult::parse(redirect)).await
    }

    /// Cancel an in-flight [`authorize`](Self::authorize) poll. The popup is
    /// closed and the pending future resolves with `Cancelled`.
    pub async fn cancel(&self) {
        self.cancel.read().await.cancel();
    }

    /// Verification pipeline shared by the popup and redirect variants.
    ///
    /// Order matters: the state check runs before anything else so a forged
    /// redirect is rejected without inspecting its payload, and persistence
    /// happens only after every check has passed.
    async fn verify(&self, result: AuthorizationResult) -> OAuth2Result<Grant> {
        let expected = self.expected_state.read().await.clone();
        match (expected.as_deref(), result.state()) {
            (Some(expected), Some(returned)) if expected == returned => {}
            _ => {
                warn!(
                    "Rejected redirect for client {}: state mismatch",
                    self.config.client_id
                );
                return Err(OAuth2Error::StateMismatch);
            }
        }

        if let Some(error) = result.error() {
            warn!(
                "Provider returned an error for client {}: {}",
                self.config.client_id, error
            );
            return Err(OAuth2Error::ProviderError(error.to_string()));
        }

        let access_token = result
            .access_token()
            .ok_or_else(|| OAuth2Error::InvalidRedirect("redirect carries no access_token".to_string()))?
            .to_string();

        let token_info = match self.config.token_validation_endpoint.as_deref() {
            Some(endpoint) => Some(self.validate_token(endpoint, &access_token).await?),
            None => None,
        };

        // All checks passed, persist before reporting success so a page
        // reload finds the token.
        self.tokens.put(&self.config.client_id, &access_token).await?;
        *self.access_token.write().await = Some(access_token.clone());

        info!("Authorization completed for client {}", self.config.client_id);

        Ok(Grant {
            access_token,
            params: result.into_params(),
            token_info,
        })
    }

    /// Introspect `token` and enforce the audience check.
    ///
    /// A token minted for a different client id must not be accepted, even
    /// when it is perfectly valid for that other client. Accepting it would
    /// let one client replay tokens harvested from another.
    async fn validate_token(
        &self,
        endpoint: &str,
        token: &str,
    ) -> OAuth2Result<serde_json::Value> {
        let mut url = Url::parse(endpoint)?;
        url.query_pairs_mut().append_pair("access_token", token);

        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                "Token validation failed for client {}: {}",
                self.config.client_id, error_text
            );
            return Err(OAuth2Error::TokenValidationFailed(error_text));
        }

        let body: serde_json::Value = response.json().await?;
        let token_info: TokenInfo = serde_json::from_value(body.clone())?;

        if token_info.audience != self.config.client_id {
            warn!(
                "Rejected token for client {}: audience is {}",
                self.config.client_id, token_info.audience
            );
            return Err(OAuth2Error::AudienceMismatch {
                audience: token_info.audience,
                client_id: self.config.client_id.clone(),
            });
        }

        debug!("Token validated for client {}", self.config.client_id);
        Ok(body)
    }

    /// GET a protected resource with the access token attached.
    ///
    /// The JSON payload comes back verbatim. A non-success response is
    /// wrapped together with the current authorization URL so the caller
    /// can send the user straight back through the flow.
    pub async fn call_service(&self, service_url: &str) -> OAuth2Result<serde_json::Value> {
        let token = self
            .access_token()
            .await?
            .ok_or(OAuth2Error::NoAccessToken)?;

        let mut url = Url::parse(service_url)?;
        url.query_pairs_mut().append_pair("access_token", &token);

        debug!("Calling service {}", service_url);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OAuth2Error::ServiceError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                auth_url: self.current_auth_url().await,
            });
        }

        Ok(response.json().await?)
    }

    /// Ask the provider to drop the current token.
    ///
    /// Storage is left alone; a revoked token that is still cached simply
    /// stops working at the provider.
    pub async fn revoke(&self) -> OAuth2Result<()> {
        let revoke_endpoint = self
            .config
            .revoke_endpoint
            .as_deref()
            .ok_or(OAuth2Error::MissingConfiguration("revoke_endpoint"))?;
        let token = self
            .access_token()
            .await?
            .ok_or(OAuth2Error::NoAccessToken)?;

        let mut url = Url::parse(revoke_endpoint)?;
        url.query_pairs_mut().append_pair("token", &token);

        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OAuth2Error::RevokeFailed(error_text));
        }

        info!("Token revoked for client {}", self.config.client_id);
        Ok(())
    }

    /// The current access token, if any flow ever produced one.
    ///
    /// Storage wins over memory, so a record persisted by an earlier
    /// session or by another adapter instance for the same client is
    /// picked up here.
    pub async fn access_token(&self) -> OAuth2Result<Option<String>> {
        if let Some(stored) = self.tokens.get(&self.config.client_id).await? {
            let mut guard = self.access_token.write().await;
            *guard = Some(stored.clone());
            return Ok(Some(stored));
        }
        Ok(self.access_token.read().await.clone())
    }

    /// Authorization URL to report in service errors, building one on
    /// demand when none has been handed out yet.
    async fn current_auth_url(&self) -> String {
        if let Some(url) = self.auth_url.read().await.clone() {
            return url;
        }
        match self.authorization_url().await {
            Ok((url, _)) => url,
            Err(_) => self.config.auth_endpoint.clone().unwrap_or_default(),
        }
    }
}

/// Collapse adapter errors into the coarse taxonomy hosts dispatch on.
fn classify(error: OAuth2Error) -> AuthzError {
    match error {
        OAuth2Error::StateMismatch
        | OAuth2Error::AudienceMismatch { .. }
        | OAuth2Error::ProviderError(_)
        | OAuth2Error::TokenValidationFailed(_) => AuthzError::Rejected(error.to_string()),
        OAuth2Error::WindowClosed | OAuth2Error::Cancelled | OAuth2Error::Timeout(_) => {
            AuthzError::Window(error.to_string())
        }
        OAuth2Error::SerializationError(err) => AuthzError::Serialization(err),
        OAuth2Error::CoreError(inner) => inner,
        other => AuthzError::Adapter(other.to_string()),
    }
}

#[async_trait]
impl Authorizer for OAuth2Adapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::OAuth2
    }

    async fn authorize(&self) -> AuthzResult<Grant> {
        OAuth2Adapter::authorize(self).await.map_err(classify)
    }

    async fn validate(&self, redirect: &str) -> AuthzResult<Grant> {
        OAuth2Adapter::validate(self, redirect).await.map_err(classify)
    }

    async fn call_service(&self, service_url: &str) -> AuthzResult<serde_json::Value> {
        OAuth2Adapter::call_service(self, service_url)
            .await
            .map_err(classify)
    }

    async fn revoke(&self) -> AuthzResult<()> {
        OAuth2Adapter::revoke(self).await.map_err(classify)
    }

    async fn access_token(&self) -> AuthzResult<Option<String>> {
        OAuth2Adapter::access_token(self).await.map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_authz_core::{AuthzResult, BrowserWindow, InMemoryKeyValueStore};

    struct UnusedBrowser;

    impl Browser for UnusedBrowser {
        fn open(&self, _url: &str) -> AuthzResult<Box<dyn BrowserWindow>> {
            Err(AuthzError::Window("no window expected in this test".to_string()))
        }
    }

    fn adapter_with(config: OAuth2Config) -> OAuth2Adapter {
        OAuth2Adapter::new(
            config,
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(UnusedBrowser),
        )
    }

    #[tokio::test]
    async fn test_authorization_url_parameter_order_and_values() {
        let adapter = adapter_with(
            OAuth2Config::new("client-123")
                .with_auth_endpoint("https://provider.example/auth")
                .with_redirect_url("http://localhost:8000/redirector.html")
                .with_scopes("profile calendar.readonly")
                .with_prompt("force")
                .with_state("state-1"),
        );

        let (auth_url, state) = adapter.authorization_url().await.unwrap();
        assert_eq!(state, "state-1");
        assert!(auth_url.starts_with("https://provider.example/auth?response_type=token&"));

        let parsed = Url::parse(&auth_url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("response_type".to_string(), "token".to_string()),
                ("approval_prompt".to_string(), "force".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:8000/redirector.html".to_string()
                ),
                ("scope".to_string(), "profile calendar.readonly".to_string()),
                ("state".to_string(), "state-1".to_string()),
                ("client_id".to_string(), "client-123".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_authorization_url_generates_fresh_state_per_flow() {
        let adapter = adapter_with(
            OAuth2Config::new("client-123")
                .with_auth_endpoint("https://provider.example/auth")
                .with_redirect_url("http://localhost:8000/redirector.html"),
        );

        let (_, first) = adapter.authorization_url().await.unwrap();
        let (_, second) = adapter.authorization_url().await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), 36); // uuid v4
    }

    #[tokio::test]
    async fn test_missing_auth_endpoint_is_reported() {
        let adapter = adapter_with(
            OAuth2Config::new("client-123").with_redirect_url("http://localhost:8000/cb"),
        );

        let err = adapter.authorization_url().await.unwrap_err();
        assert!(matches!(
            err,
            OAuth2Error::MissingConfiguration("auth_endpoint")
        ));
    }

    #[tokio::test]
    async fn test_missing_redirect_url_is_reported() {
        let adapter = adapter_with(
            OAuth2Config::new("client-123").with_auth_endpoint("https://provider.example/auth"),
        );

        let err = adapter.authorization_url().await.unwrap_err();
        assert!(matches!(
            err,
            OAuth2Error::MissingConfiguration("redirect_url")
        ));
    }

    #[test]
    fn test_classify_maps_rejections_and_window_failures() {
        assert!(matches!(
            classify(OAuth2Error::StateMismatch),
            AuthzError::Rejected(_)
        ));
        assert!(matches!(
            classify(OAuth2Error::AudienceMismatch {
                audience: "other".to_string(),
                client_id: "me".to_string(),
            }),
            AuthzError::Rejected(_)
        ));
        assert!(matches!(
            classify(OAuth2Error::WindowClosed),
            AuthzError::Window(_)
        ));
        assert!(matches!(
            classify(OAuth2Error::NoAccessToken),
            AuthzError::Adapter(_)
        ));
    }
}
