//! Token persistence.
//!
//! Tokens live in the host-provided key/value store as a small JSON record
//! keyed by client id, so a token written by one adapter instance is
//! picked up by the next one constructed for the same client.

use ag_authz_core::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::OAuth2Result;

const KEY_PREFIX: &str = "ag-oauth2-";

/// The persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Wraps the key/value collaborator with the token-record encoding.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Storage key under which a client's token lives.
    pub fn key(client_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, client_id)
    }

    /// Read the persisted token for `client_id`, if any.
    pub async fn get(&self, client_id: &str) -> OAuth2Result<Option<String>> {
        let Some(raw) = self.store.get(&Self::key(client_id)).await? else {
            return Ok(None);
        };
        let record: StoredToken = serde_json::from_str(&raw)?;
        Ok(Some(record.access_token))
    }

    /// Persist `token` for `client_id`, replacing any previous record.
    pub async fn put(&self, client_id: &str, token: &str) -> OAuth2Result<()> {
        let record = StoredToken {
            access_token: token.to_string(),
        };
        let raw = serde_json::to_string(&record)?;
        self.store.set(&Self::key(client_id), raw).await?;
        Ok(())
    }
}
