//! OAuth2 error types.

use std::time::Duration;
use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    /// The `state` on the redirect is not the one this adapter handed out.
    #[error("returned state does not match the expected state")]
    StateMismatch,

    /// The provider answered the authorization request with an `error`
    /// parameter instead of a token.
    #[error("provider returned an error: {0}")]
    ProviderError(String),

    /// Introspection says the token was minted for a different client.
    #[error("token audience '{audience}' does not match client id '{client_id}'")]
    AudienceMismatch { audience: String, client_id: String },

    /// The validation endpoint rejected the introspection request.
    #[error("token validation failed: {0}")]
    TokenValidationFailed(String),

    /// The revocation endpoint rejected the request.
    #[error("token revocation failed: {0}")]
    RevokeFailed(String),

    /// A protected-resource call came back non-success. `auth_url` points
    /// at the authorization endpoint so the caller can send the user back
    /// through the flow.
    #[error("service call failed with status {status} {status_text}")]
    ServiceError {
        status: u16,
        status_text: String,
        auth_url: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The user closed the authorization window before the provider
    /// redirected back.
    #[error("authorization window was closed before the flow completed")]
    WindowClosed,

    /// `cancel()` fired while a flow was polling.
    #[error("authorization flow was cancelled")]
    Cancelled,

    /// The popup never produced a redirect within the configured window.
    #[error("authorization flow timed out after {0:?}")]
    Timeout(Duration),

    /// An operation needed a configuration field that was never set.
    #[error("missing required configuration: {0}")]
    MissingConfiguration(&'static str),

    /// The redirect parsed cleanly but carried nothing usable.
    #[error("invalid redirect: {0}")]
    InvalidRedirect(String),

    /// `call_service()` or `revoke()` ran before any flow produced a token.
    #[error("no access token available, run the authorization flow first")]
    NoAccessToken,

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] ag_authz_core::AuthzError),
}

impl OAuth2Error {
    /// HTTP-style status of the failure, for the errors that carry one.
    ///
    /// State and audience rejections report 401, matching how a resource
    /// server would answer the unauthenticated request they prevent.
    pub fn status(&self) -> Option<u16> {
        match self {
            OAuth2Error::StateMismatch | OAuth2Error::AudienceMismatch { .. } => Some(401),
            OAuth2Error::ServiceError { status, .. } => Some(*status),
            OAuth2Error::HttpError(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
