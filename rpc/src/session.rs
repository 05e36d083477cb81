//! Session resolution capability.
//!
//! The credential collaborator is external to this service; handlers only
//! need `token → AccountId`. The [`TokenTable`] implementation backs local
//! deployments and tests; production plugs in the real credential service.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use pension_types::AccountId;

/// Resolves a session token to the account it authenticates.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<AccountId>;
}

/// In-memory token → account mapping.
#[derive(Default)]
pub struct TokenTable {
    tokens: RwLock<HashMap<String, AccountId>>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an account (seeding and tests).
    pub fn insert(&self, token: impl Into<String>, account: AccountId) {
        self.tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.into(), account);
    }
}

impl SessionResolver for TokenTable {
    fn resolve(&self, token: &str) -> Option<AccountId> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .copied()
    }
}

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
