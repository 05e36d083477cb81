//! Offline-sync reconciliation.
//!
//! A client that verified a beneficiary while disconnected submits the event
//! later as a JSON payload with data-URI-embedded photos. Reconciliation
//! decodes and stores whatever evidence is usable, then commits through the
//! same ledger path as a live attempt. The offline client already performed
//! its own check, so stored evidence auto-approves — the matcher is not
//! consulted.
//!
//! Ingestion is at-least-once: replaying the same offline event produces a
//! new attempt row each time. There is deliberately no deduplication key.

use std::sync::Arc;

use pension_evidence::{EvidenceError, EvidenceStore};
use pension_store::{AccountStore, Ledger, NewAttempt, VerificationAttempt};
use pension_types::{AccountId, AttemptStatus, ServiceParams, Timestamp, WalletAddress};

use crate::datauri;
use crate::error::VerificationError;
use crate::scheduler;

/// One offline verification event, as submitted by the sync client.
#[derive(Clone, Debug, Default)]
pub struct SyncPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub national_id: Option<String>,
    pub wallet: Option<WalletAddress>,
    /// Identity document photo as a `data:image/...;base64,` URI.
    pub id_photo: Option<String>,
    /// Live capture photo as a `data:image/...;base64,` URI.
    pub face_photo: Option<String>,
}

/// Merges offline verification events into server state.
pub struct SyncReconciler {
    ledger: Arc<dyn Ledger>,
    evidence: Arc<dyn EvidenceStore>,
    params: ServiceParams,
}

impl SyncReconciler {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        evidence: Arc<dyn EvidenceStore>,
        params: ServiceParams,
    ) -> Self {
        Self {
            ledger,
            evidence,
            params,
        }
    }

    /// Reconcile one offline event for an authenticated account.
    ///
    /// A photo that fails to decode is logged and dropped — the remaining
    /// slot still counts. The attempt approves when at least one photo was
    /// stored, otherwise it is rejected (still committed, for the audit
    /// trail).
    pub fn reconcile(
        &self,
        account_id: AccountId,
        payload: SyncPayload,
    ) -> Result<VerificationAttempt, VerificationError> {
        if payload.first_name.as_deref().unwrap_or("").is_empty() {
            return Err(VerificationError::MissingField("firstName"));
        }
        if payload.last_name.as_deref().unwrap_or("").is_empty() {
            return Err(VerificationError::MissingField("lastName"));
        }
        let wallet = payload
            .wallet
            .ok_or(VerificationError::MissingField("walletAddress"))?;

        let account = self
            .ledger
            .get_account(account_id)
            .map_err(|_| VerificationError::AccountNotFound(account_id))?;

        let document_ref =
            self.store_embedded(account_id, payload.id_photo.as_deref(), "sync_id")?;
        let live_ref =
            self.store_embedded(account_id, payload.face_photo.as_deref(), "sync_face")?;

        // The offline client vouched for the check; stored evidence
        // auto-approves.
        let now = Timestamp::now();
        let (status, last_verified_at, next_due) =
            if document_ref.is_some() || live_ref.is_some() {
                let due = scheduler::next_due(now, self.params.verification_cadence_days);
                (AttemptStatus::Approved, Some(now), Some(due))
            } else {
                (AttemptStatus::Rejected, None, None)
            };

        // Reconciliation never performs first-time linkage; it records the
        // account's current id (or the unset placeholder).
        let attempt = self.ledger.commit_attempt(
            NewAttempt {
                beneficiary_id: account.beneficiary_id,
                account_id,
                wallet,
                document_evidence: document_ref,
                live_evidence: live_ref,
                status,
                created_at: now,
                last_verified_at,
                next_due,
            },
            None,
        )?;

        tracing::info!(
            account = %account_id,
            attempt = %attempt.id,
            status = %attempt.status,
            "offline verification reconciled"
        );
        Ok(attempt)
    }

    /// Decode and persist one embedded photo slot.
    ///
    /// Client-data failures (undecodable URI, unusable payload) drop the slot;
    /// infrastructure failures propagate.
    fn store_embedded(
        &self,
        account_id: AccountId,
        uri: Option<&str>,
        tag: &str,
    ) -> Result<Option<pension_types::EvidenceRef>, VerificationError> {
        let Some(uri) = uri else {
            return Ok(None);
        };

        let (mime, bytes) = match datauri::decode_image(uri) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(account = %account_id, slot = tag, error = %e,
                    "dropping undecodable evidence slot");
                return Ok(None);
            }
        };

        match self.evidence.store(&bytes, &mime, tag) {
            Ok(reference) => Ok(Some(reference)),
            Err(e @ EvidenceError::Io(_)) => Err(VerificationError::Evidence(e)),
            Err(e) => {
                tracing::warn!(account = %account_id, slot = tag, error = %e,
                    "dropping unusable evidence slot");
                Ok(None)
            }
        }
    }
}
