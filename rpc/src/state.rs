//! Application state for API handlers.

use std::sync::Arc;

use axum::http::HeaderMap;
use pension_store::Ledger;
use pension_types::{AccountId, Timestamp};
use pension_verification::{SyncReconciler, VerificationEngine};

use crate::error::RpcError;
use crate::session::{bearer_token, SessionResolver};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub engine: Arc<VerificationEngine>,
    pub reconciler: Arc<SyncReconciler>,
    pub sessions: Arc<dyn SessionResolver>,
    pub started_at: Timestamp,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        engine: Arc<VerificationEngine>,
        reconciler: Arc<SyncReconciler>,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        Self {
            ledger,
            engine,
            reconciler,
            sessions,
            started_at: Timestamp::now(),
        }
    }

    /// Resolve the caller's account from the bearer token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AccountId, RpcError> {
        let token = bearer_token(headers).ok_or(RpcError::NotAuthenticated)?;
        self.sessions
            .resolve(token)
            .ok_or(RpcError::NotAuthenticated)
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed_since(Timestamp::now())
    }
}
