//! Unified ledger trait — the one write path shared by every backend.

use crate::account::AccountStore;
use crate::attempt::{AttemptStore, NewAttempt, VerificationAttempt};
use crate::StoreError;
use pension_types::{AccountId, BeneficiaryId};
use serde::{Deserialize, Serialize};

/// A one-time beneficiary-id binding requested alongside an attempt commit.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AccountLinkage {
    pub account: AccountId,
    pub beneficiary: BeneficiaryId,
}

/// Unified ledger interface.
///
/// `commit_attempt` is the single write path for verification outcomes and
/// must be atomic: the attempt row and the optional account linkage either
/// both commit or both roll back. The linkage is compare-and-swap — it is
/// applied only while the account's beneficiary id is still unset, so two
/// racing submissions resolve to exactly one winner. The loser's attempt row
/// still commits.
///
/// The trait is object-safe on purpose: the verification engine holds an
/// injected `Arc<dyn Ledger>` so backends can be swapped without touching it.
pub trait Ledger: AccountStore + AttemptStore + Send + Sync {
    /// Allocate an attempt id, persist the attempt, and apply the linkage
    /// (if any, and if still applicable) in one transaction.
    fn commit_attempt(
        &self,
        attempt: NewAttempt,
        linkage: Option<AccountLinkage>,
    ) -> Result<VerificationAttempt, StoreError>;
}
