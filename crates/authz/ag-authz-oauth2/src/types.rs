//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Introspection document returned by the token validation endpoint.
///
/// The field set follows Google's `tokeninfo` response. Providers attach
/// whatever extra claims they like; those are collected in `extra` so the
/// full document survives a round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Client the token was minted for. Verification compares this against
    /// the adapter's own client id and rejects tokens minted for anyone
    /// else. Absent in the response means empty, which never matches.
    #[serde(default)]
    pub audience: String,

    /// Space-delimited scopes granted to the token.
    pub scope: Option<String>,

    /// Remaining lifetime in seconds.
    pub expires_in: Option<u64>,

    /// Provider-side identifier of the resource owner.
    pub user_id: Option<String>,

    /// Additional provider-specific claims.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_info_deserializes_google_shape() {
        let body = serde_json::json!({
            "audience": "client-123",
            "scope": "profile email",
            "expires_in": 3599,
            "user_id": "user-9",
            "verified_email": true
        });

        let info: TokenInfo = serde_json::from_value(body).unwrap();
        assert_eq!(info.audience, "client-123");
        assert_eq!(info.scope.as_deref(), Some("profile email"));
        assert_eq!(info.expires_in, Some(3599));
        assert_eq!(info.user_id.as_deref(), Some("user-9"));
        assert_eq!(
            info.extra.get("verified_email"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn test_missing_audience_defaults_to_empty() {
        let info: TokenInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(info.audience, "");
        assert!(info.scope.is_none());
    }
}
