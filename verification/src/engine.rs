//! Verification orchestrator — connects evidence intake, identity matching,
//! ledger commits, and recurrence scheduling into the live submission
//! workflow.

use std::sync::Arc;

use pension_evidence::EvidenceStore;
use pension_store::{AccountLinkage, AccountStore, Ledger, NewAttempt, VerificationAttempt};
use pension_types::{
    AccountId, AttemptStatus, BeneficiaryId, ServiceParams, Timestamp, WalletAddress,
};

use crate::error::VerificationError;
use crate::matcher::{IdentityMatcher, MatchContext};
use crate::scheduler;

/// One image as received from the client, before evidence storage.
#[derive(Clone, Debug)]
pub struct EvidenceUpload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// A live verification submission.
#[derive(Clone, Debug)]
pub struct LiveSubmission {
    /// Caller-supplied beneficiary id; `UNSET` when the client does not know
    /// it yet.
    pub beneficiary_hint: BeneficiaryId,
    pub wallet: WalletAddress,
    pub document_photo: Option<EvidenceUpload>,
    pub live_photo: Option<EvidenceUpload>,
}

/// The engine driving a live attempt from intake to terminal outcome.
pub struct VerificationEngine {
    ledger: Arc<dyn Ledger>,
    evidence: Arc<dyn EvidenceStore>,
    matcher: Arc<dyn IdentityMatcher>,
    params: ServiceParams,
}

impl VerificationEngine {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        evidence: Arc<dyn EvidenceStore>,
        matcher: Arc<dyn IdentityMatcher>,
        params: ServiceParams,
    ) -> Self {
        Self {
            ledger,
            evidence,
            matcher,
            params,
        }
    }

    pub fn params(&self) -> &ServiceParams {
        &self.params
    }

    /// Process a live submission for an authenticated account.
    ///
    /// Exactly one attempt row is committed (on success *or* rejection); at
    /// most one account mutation happens — the one-time beneficiary linkage,
    /// inside the same transaction as the attempt row. Evidence blobs written
    /// before a failed commit are accepted orphans.
    pub fn submit(
        &self,
        account_id: AccountId,
        submission: LiveSubmission,
    ) -> Result<VerificationAttempt, VerificationError> {
        if submission.document_photo.is_none() && submission.live_photo.is_none() {
            return Err(VerificationError::MissingEvidence);
        }

        let account = self
            .ledger
            .get_account(account_id)
            .map_err(|_| VerificationError::AccountNotFound(account_id))?;

        // Each image persists independently; one never blocks on the other.
        let document_ref = submission
            .document_photo
            .map(|photo| self.evidence.store(&photo.bytes, &photo.mime, "id"))
            .transpose()?;
        let live_ref = submission
            .live_photo
            .map(|photo| self.evidence.store(&photo.bytes, &photo.mime, "face"))
            .transpose()?;

        // The caller's hint wins unless it is the sentinel and the account
        // already carries an id.
        let beneficiary_id =
            if submission.beneficiary_hint.is_unset() && !account.beneficiary_id.is_unset() {
                account.beneficiary_id
            } else {
                submission.beneficiary_hint
            };

        // With both images the matcher rules; with one image this is a
        // first-enrollment baseline and passes unconditionally.
        let verdict = match (&live_ref, &document_ref) {
            (Some(live), Some(document)) => {
                let ctx = MatchContext { beneficiary_id };
                match self.matcher.compare(live, document, &ctx) {
                    Ok(matched) => matched,
                    Err(e) => {
                        // Degrade to a rejection — never to a silent pass.
                        tracing::warn!(
                            matcher = self.matcher.name(),
                            account = %account_id,
                            error = %e,
                            "matcher unavailable; recording attempt as rejected"
                        );
                        false
                    }
                }
            }
            _ => true,
        };

        let now = Timestamp::now();
        let (status, last_verified_at, next_due) = if verdict {
            let due = scheduler::next_due(now, self.params.verification_cadence_days);
            (AttemptStatus::Verified, Some(now), Some(due))
        } else {
            (AttemptStatus::Rejected, None, None)
        };

        let linkage = (verdict && account.beneficiary_id.is_unset() && !beneficiary_id.is_unset())
            .then_some(AccountLinkage {
                account: account_id,
                beneficiary: beneficiary_id,
            });

        let attempt = self.ledger.commit_attempt(
            NewAttempt {
                beneficiary_id,
                account_id,
                wallet: submission.wallet,
                document_evidence: document_ref,
                live_evidence: live_ref,
                status,
                created_at: now,
                last_verified_at,
                next_due,
            },
            linkage,
        )?;

        tracing::info!(
            account = %account_id,
            attempt = %attempt.id,
            status = %attempt.status,
            linked = linkage.is_some(),
            "live verification attempt committed"
        );
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlwaysMatch;
    use pension_evidence::MemoryEvidenceStore;
    use pension_store::{AccountStore, AttemptStore, MemoryLedger, NewAccount};
    use pension_types::time::SECS_PER_DAY;
    use pension_types::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Matcher that rejects everything.
    struct RejectAll;

    impl IdentityMatcher for RejectAll {
        fn name(&self) -> &str {
            "reject-all"
        }
        fn compare(
            &self,
            _live: &pension_types::EvidenceRef,
            _document: &pension_types::EvidenceRef,
            _ctx: &MatchContext,
        ) -> Result<bool, crate::MatcherError> {
            Ok(false)
        }
    }

    /// Matcher that always errors.
    struct Unavailable;

    impl IdentityMatcher for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }
        fn compare(
            &self,
            _live: &pension_types::EvidenceRef,
            _document: &pension_types::EvidenceRef,
            _ctx: &MatchContext,
        ) -> Result<bool, crate::MatcherError> {
            Err(crate::MatcherError::Unavailable("backend down".into()))
        }
    }

    /// Matcher that counts invocations, passing everything.
    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl IdentityMatcher for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn compare(
            &self,
            _live: &pension_types::EvidenceRef,
            _document: &pension_types::EvidenceRef,
            _ctx: &MatchContext,
        ) -> Result<bool, crate::MatcherError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn test_wallet() -> WalletAddress {
        WalletAddress::new("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc")
    }

    fn test_photo() -> EvidenceUpload {
        EvidenceUpload {
            bytes: b"fake-image-bytes".to_vec(),
            mime: "image/jpeg".into(),
        }
    }

    fn seed_account(ledger: &MemoryLedger) -> AccountId {
        ledger
            .create_account(NewAccount {
                email: "pensioner@example.com".into(),
                credential_hash: None,
                first_name: "John".into(),
                last_name: "Doe".into(),
                phone: None,
                date_of_birth: None,
                address: None,
                city: None,
                postal_code: None,
                country: None,
                wallet: Some(test_wallet()),
                role: Role::Beneficiary,
                created_at: Timestamp::new(1_000),
            })
            .unwrap()
            .id
    }

    fn engine_with(
        matcher: Arc<dyn IdentityMatcher>,
    ) -> (Arc<MemoryLedger>, Arc<MemoryEvidenceStore>, VerificationEngine) {
        let ledger = Arc::new(MemoryLedger::new());
        let evidence = Arc::new(MemoryEvidenceStore::new());
        let engine = VerificationEngine::new(
            ledger.clone(),
            evidence.clone(),
            matcher,
            ServiceParams::defaults(),
        );
        (ledger, evidence, engine)
    }

    fn submission(hint: u64, document: bool, live: bool) -> LiveSubmission {
        LiveSubmission {
            beneficiary_hint: BeneficiaryId::new(hint),
            wallet: test_wallet(),
            document_photo: document.then(test_photo),
            live_photo: live.then(test_photo),
        }
    }

    // ── First enrollment ─────────────────────────────────────────────────

    #[test]
    fn first_enrollment_with_one_photo_verifies_and_links() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        let attempt = engine
            .submit(account_id, submission(42, true, false))
            .unwrap();

        assert_eq!(attempt.status, AttemptStatus::Verified);
        assert_eq!(attempt.beneficiary_id, BeneficiaryId::new(42));
        assert!(attempt.document_evidence.is_some());
        assert!(attempt.live_evidence.is_none());

        let verified_at = attempt.last_verified_at.expect("verified timestamp");
        let due = attempt.next_due.expect("due date");
        assert_eq!(due.as_secs(), verified_at.as_secs() + 180 * SECS_PER_DAY);

        let account = ledger.get_account(account_id).unwrap();
        assert_eq!(account.beneficiary_id, BeneficiaryId::new(42));
    }

    #[test]
    fn single_photo_enrollment_never_consults_the_matcher() {
        let matcher = Arc::new(Counting::default());
        let (ledger, _evidence, engine) = engine_with(matcher.clone());
        let account_id = seed_account(&ledger);

        engine
            .submit(account_id, submission(42, false, true))
            .unwrap();

        assert_eq!(matcher.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sentinel_hint_without_linkage_leaves_account_unlinked() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        let attempt = engine
            .submit(account_id, submission(0, true, false))
            .unwrap();

        assert_eq!(attempt.status, AttemptStatus::Verified);
        assert!(attempt.beneficiary_id.is_unset());
        assert!(ledger.get_account(account_id).unwrap().beneficiary_id.is_unset());
    }

    // ── Beneficiary id resolution ────────────────────────────────────────

    #[test]
    fn sentinel_hint_resolves_to_stored_beneficiary_id() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        engine
            .submit(account_id, submission(42, true, false))
            .unwrap();

        // Re-verify with the sentinel; the stored id must win over 0.
        let attempt = engine
            .submit(account_id, submission(0, true, true))
            .unwrap();
        assert_eq!(attempt.beneficiary_id, BeneficiaryId::new(42));
    }

    #[test]
    fn explicit_hint_is_recorded_but_linkage_is_never_overwritten() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        engine
            .submit(account_id, submission(42, true, false))
            .unwrap();
        let attempt = engine
            .submit(account_id, submission(77, true, true))
            .unwrap();

        // The attempt carries the caller's hint; the account keeps its
        // original binding.
        assert_eq!(attempt.beneficiary_id, BeneficiaryId::new(77));
        assert_eq!(
            ledger.get_account(account_id).unwrap().beneficiary_id,
            BeneficiaryId::new(42)
        );
    }

    // ── Validation ───────────────────────────────────────────────────────

    #[test]
    fn zero_photos_fails_before_any_persistence() {
        let (ledger, evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        let err = engine
            .submit(account_id, submission(42, false, false))
            .unwrap_err();

        assert!(matches!(err, VerificationError::MissingEvidence));
        assert_eq!(ledger.attempt_count().unwrap(), 0);
        assert!(evidence.is_empty());
    }

    #[test]
    fn unknown_account_is_rejected() {
        let (_ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));

        let err = engine
            .submit(AccountId(999), submission(42, true, false))
            .unwrap_err();
        assert!(matches!(err, VerificationError::AccountNotFound(_)));
    }

    // ── Matcher outcomes ─────────────────────────────────────────────────

    #[test]
    fn matcher_rejection_leaves_no_due_date_and_no_linkage() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(RejectAll));
        let account_id = seed_account(&ledger);

        let attempt = engine
            .submit(account_id, submission(42, true, true))
            .unwrap();

        assert_eq!(attempt.status, AttemptStatus::Rejected);
        assert!(attempt.last_verified_at.is_none());
        assert!(attempt.next_due.is_none());
        assert!(ledger.get_account(account_id).unwrap().beneficiary_id.is_unset());
        // The rejected attempt is still part of the audit trail.
        assert_eq!(ledger.attempt_count().unwrap(), 1);
    }

    #[test]
    fn rejection_on_a_linked_account_leaves_the_binding_untouched() {
        let ledger = Arc::new(MemoryLedger::new());
        let evidence = Arc::new(MemoryEvidenceStore::new());
        let account_id = seed_account(&ledger);

        // Link through a passing engine first.
        VerificationEngine::new(
            ledger.clone(),
            evidence.clone(),
            Arc::new(AlwaysMatch),
            ServiceParams::defaults(),
        )
        .submit(account_id, submission(42, true, false))
        .unwrap();

        // Then fail a re-verification with both photos.
        let attempt = VerificationEngine::new(
            ledger.clone(),
            evidence,
            Arc::new(RejectAll),
            ServiceParams::defaults(),
        )
        .submit(account_id, submission(0, true, true))
        .unwrap();

        assert_eq!(attempt.status, AttemptStatus::Rejected);
        assert_eq!(attempt.beneficiary_id, BeneficiaryId::new(42));
        assert!(attempt.next_due.is_none());
        assert_eq!(
            ledger.get_account(account_id).unwrap().beneficiary_id,
            BeneficiaryId::new(42)
        );
    }

    #[test]
    fn matcher_failure_degrades_to_rejection_not_approval() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(Unavailable));
        let account_id = seed_account(&ledger);

        let attempt = engine
            .submit(account_id, submission(42, true, true))
            .unwrap();

        assert_eq!(attempt.status, AttemptStatus::Rejected);
        assert!(attempt.next_due.is_none());
    }

    #[test]
    fn both_photos_are_stored_before_the_decision() {
        let (ledger, evidence, engine) = engine_with(Arc::new(RejectAll));
        let account_id = seed_account(&ledger);

        let attempt = engine
            .submit(account_id, submission(42, true, true))
            .unwrap();

        // Even a rejected attempt references its stored evidence.
        assert!(attempt.document_evidence.is_some());
        assert!(attempt.live_evidence.is_some());
        assert_eq!(evidence.len(), 2);
    }

    // ── Linkage race ─────────────────────────────────────────────────────

    #[test]
    fn concurrent_submissions_resolve_to_exactly_one_linkage() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);
        let engine = Arc::new(engine);

        let handles: Vec<_> = [41u64, 43u64]
            .into_iter()
            .map(|hint| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.submit(account_id, submission(hint, true, false)))
            })
            .collect();

        let attempts: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("submit failed"))
            .collect();

        // Both attempts persisted, each verified with its own hint.
        assert_eq!(ledger.attempt_count().unwrap(), 2);
        for attempt in &attempts {
            assert_eq!(attempt.status, AttemptStatus::Verified);
        }

        // Exactly one hint won the linkage.
        let bound = ledger.get_account(account_id).unwrap().beneficiary_id;
        assert!(bound == BeneficiaryId::new(41) || bound == BeneficiaryId::new(43));
    }

    // ── Audit trail ──────────────────────────────────────────────────────

    #[test]
    fn attempts_accumulate_in_creation_order() {
        let (ledger, _evidence, engine) = engine_with(Arc::new(AlwaysMatch));
        let account_id = seed_account(&ledger);

        for _ in 0..3 {
            engine
                .submit(account_id, submission(42, true, false))
                .unwrap();
        }

        let history = ledger.attempts_for_account(account_id).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));
    }
}
