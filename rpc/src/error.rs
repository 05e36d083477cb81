//! RPC error types and their wire mapping.
//!
//! Every failure leaving the API is `{"success": false, "message": …}` with a
//! stable status code. Internal details are logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pension_evidence::EvidenceError;
use pension_store::StoreError;
use pension_verification::VerificationError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Account not found")]
    AccountNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("server error: {0}")]
    Internal(String),
}

impl RpcError {
    fn status(&self) -> StatusCode {
        match self {
            RpcError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            RpcError::AccountNotFound => StatusCode::NOT_FOUND,
            RpcError::Validation(_) => StatusCode::BAD_REQUEST,
            RpcError::Forbidden(_) => StatusCode::FORBIDDEN,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VerificationError> for RpcError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::AccountNotFound(_) => RpcError::AccountNotFound,
            VerificationError::MissingEvidence | VerificationError::MissingField(_) => {
                RpcError::Validation(e.to_string())
            }
            // Client-supplied payload problems are 4xx; infrastructure is 5xx.
            VerificationError::Evidence(EvidenceError::Io(_)) => RpcError::Internal(e.to_string()),
            VerificationError::Evidence(_) => RpcError::Validation(e.to_string()),
            VerificationError::Storage(_) => RpcError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for RpcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => RpcError::AccountNotFound,
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The detail stays in the server log.
            tracing::error!(error = %self, "internal error while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
