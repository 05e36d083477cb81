//! Verification attempt storage.
//!
//! Attempts are an append-only audit trail: no update or delete operation
//! exists anywhere on these traits. Corrections happen via new attempts.

use crate::StoreError;
use pension_types::{
    AccountId, AttemptId, AttemptStatus, BeneficiaryId, EvidenceRef, Timestamp, WalletAddress,
};
use serde::{Deserialize, Serialize};

/// One evidence submission and its terminal outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationAttempt {
    pub id: AttemptId,
    pub beneficiary_id: BeneficiaryId,
    pub account_id: AccountId,
    pub wallet: WalletAddress,
    /// Stored identity-document evidence, when supplied.
    pub document_evidence: Option<EvidenceRef>,
    /// Stored live-capture evidence, when supplied.
    pub live_evidence: Option<EvidenceRef>,
    pub status: AttemptStatus,
    pub created_at: Timestamp,
    /// Set only when the outcome is a success.
    pub last_verified_at: Option<Timestamp>,
    /// Next re-verification deadline; set only when the outcome is a success.
    pub next_due: Option<Timestamp>,
}

impl VerificationAttempt {
    pub fn has_evidence(&self) -> bool {
        self.document_evidence.is_some() || self.live_evidence.is_some()
    }
}

/// An attempt before the ledger has allocated its id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAttempt {
    pub beneficiary_id: BeneficiaryId,
    pub account_id: AccountId,
    pub wallet: WalletAddress,
    pub document_evidence: Option<EvidenceRef>,
    pub live_evidence: Option<EvidenceRef>,
    pub status: AttemptStatus,
    pub created_at: Timestamp,
    pub last_verified_at: Option<Timestamp>,
    pub next_due: Option<Timestamp>,
}

impl NewAttempt {
    pub fn into_attempt(self, id: AttemptId) -> VerificationAttempt {
        VerificationAttempt {
            id,
            beneficiary_id: self.beneficiary_id,
            account_id: self.account_id,
            wallet: self.wallet,
            document_evidence: self.document_evidence,
            live_evidence: self.live_evidence,
            status: self.status,
            created_at: self.created_at,
            last_verified_at: self.last_verified_at,
            next_due: self.next_due,
        }
    }
}

/// Read side of the attempt ledger.
pub trait AttemptStore {
    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError>;

    /// All attempts for an account, in creation order.
    fn attempts_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<VerificationAttempt>, StoreError>;

    fn attempt_count(&self) -> Result<u64, StoreError>;
}
