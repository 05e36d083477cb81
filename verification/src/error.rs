use pension_evidence::EvidenceError;
use pension_store::StoreError;
use pension_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("at least one photo is required for verification")]
    MissingEvidence,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("evidence storage failed: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("ledger write failed: {0}")]
    Storage(#[from] StoreError),
}
