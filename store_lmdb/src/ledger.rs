//! The LMDB-backed ledger: the single atomic write path.

use std::path::Path;

use pension_store::{AccountLinkage, Ledger, NewAttempt, StoreError, VerificationAttempt};
use pension_store::account::AccountRecord;
use pension_types::AttemptId;

use crate::environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
use crate::LmdbError;

pub(crate) const SEQ_ACCOUNT: &[u8] = b"next_account_id";
pub(crate) const SEQ_ATTEMPT: &[u8] = b"next_attempt_id";

/// LMDB implementation of [`Ledger`].
pub struct LmdbLedger {
    pub(crate) env: LmdbEnvironment,
}

impl LmdbLedger {
    /// Open or create the ledger under the given data directory.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, StoreError> {
        let env = LmdbEnvironment::open(path, map_size).map_err(StoreError::from)?;
        Ok(Self { env })
    }
}

impl Ledger for LmdbLedger {
    fn commit_attempt(
        &self,
        attempt: NewAttempt,
        linkage: Option<AccountLinkage>,
    ) -> Result<VerificationAttempt, StoreError> {
        let env = &self.env;
        let mut wtxn = env.env.write_txn().map_err(LmdbError::from)?;

        // Apply the linkage first: read the current binding inside this
        // write transaction (LMDB serializes writers, so this is the atomic
        // read-modify-write the one-time linkage needs).
        if let Some(link) = linkage {
            let key = link.account.as_u64().to_be_bytes();
            let record: AccountRecord = match env
                .accounts_db
                .get(&wtxn, &key)
                .map_err(LmdbError::from)?
            {
                Some(raw) => bincode::deserialize(raw).map_err(LmdbError::from)?,
                None => return Err(StoreError::NotFound(link.account.to_string())),
            };
            if record.beneficiary_id.is_unset() {
                let mut record = record;
                record.beneficiary_id = link.beneficiary;
                let raw = bincode::serialize(&record).map_err(LmdbError::from)?;
                env.accounts_db
                    .put(&mut wtxn, &key, &raw)
                    .map_err(LmdbError::from)?;
            }
        }

        let id = env.bump_sequence(&mut wtxn, SEQ_ATTEMPT)?;
        let attempt = attempt.into_attempt(AttemptId(id));

        let raw = bincode::serialize(&attempt).map_err(LmdbError::from)?;
        env.attempts_db
            .put(&mut wtxn, &id.to_be_bytes(), &raw)
            .map_err(LmdbError::from)?;

        let mut composite = attempt.account_id.as_u64().to_be_bytes().to_vec();
        composite.extend_from_slice(&id.to_be_bytes());
        env.account_attempts_db
            .put(&mut wtxn, &composite, &id.to_be_bytes())
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pension_store::{AccountStore, AttemptStore, NewAccount};
    use pension_types::{
        AccountId, AttemptStatus, BeneficiaryId, Role, Timestamp, WalletAddress,
    };

    fn temp_ledger() -> (tempfile::TempDir, LmdbLedger) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let ledger = LmdbLedger::open_with_map_size(dir.path(), 10 * 1024 * 1024)
            .expect("failed to open ledger");
        (dir, ledger)
    }

    fn test_account(email: &str, wallet: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            credential_hash: None,
            first_name: "John".into(),
            last_name: "Doe".into(),
            phone: None,
            date_of_birth: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            wallet: Some(WalletAddress::new(wallet)),
            role: Role::Beneficiary,
            created_at: Timestamp::new(1_000),
        }
    }

    fn test_attempt(account: AccountId, beneficiary: u64) -> NewAttempt {
        NewAttempt {
            beneficiary_id: BeneficiaryId::new(beneficiary),
            account_id: account,
            wallet: WalletAddress::new("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc"),
            document_evidence: None,
            live_evidence: None,
            status: AttemptStatus::Verified,
            created_at: Timestamp::new(2_000),
            last_verified_at: Some(Timestamp::new(2_000)),
            next_due: Some(Timestamp::new(2_000).plus_days(180)),
        }
    }

    #[test]
    fn account_round_trip_with_indexes() {
        let (_dir, ledger) = temp_ledger();
        let created = ledger
            .create_account(test_account(
                "a@x.com",
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();

        let by_id = ledger.get_account(created.id).unwrap();
        assert_eq!(by_id.email, "a@x.com");

        let by_wallet = ledger
            .find_by_wallet(&WalletAddress::new(
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap()
            .expect("wallet lookup");
        assert_eq!(by_wallet.id, created.id);

        let by_email = ledger.find_by_email("a@x.com").unwrap().expect("email lookup");
        assert_eq!(by_email.id, created.id);

        assert_eq!(ledger.account_count().unwrap(), 1);
    }

    #[test]
    fn duplicate_email_and_wallet_rejected() {
        let (_dir, ledger) = temp_ledger();
        ledger
            .create_account(test_account(
                "a@x.com",
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();

        let dup_email = ledger.create_account(test_account(
            "a@x.com",
            "0xbb44cdddb6a900fa2b585dd299e03d12fa4293bc",
        ));
        assert!(matches!(dup_email, Err(StoreError::Duplicate(_))));

        let dup_wallet = ledger.create_account(test_account(
            "b@x.com",
            "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
        ));
        assert!(matches!(dup_wallet, Err(StoreError::Duplicate(_))));

        assert_eq!(ledger.account_count().unwrap(), 1);
    }

    #[test]
    fn attempts_scan_in_creation_order_per_account() {
        let (_dir, ledger) = temp_ledger();
        let a = ledger
            .create_account(test_account(
                "a@x.com",
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();
        let b = ledger
            .create_account(test_account(
                "b@x.com",
                "0xbb44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();

        // Interleave commits across the two accounts.
        ledger.commit_attempt(test_attempt(a.id, 1), None).unwrap();
        ledger.commit_attempt(test_attempt(b.id, 2), None).unwrap();
        ledger.commit_attempt(test_attempt(a.id, 3), None).unwrap();

        let for_a = ledger.attempts_for_account(a.id).unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a[0].id < for_a[1].id);
        assert!(for_a.iter().all(|at| at.account_id == a.id));

        let for_b = ledger.attempts_for_account(b.id).unwrap();
        assert_eq!(for_b.len(), 1);

        assert_eq!(ledger.attempt_count().unwrap(), 3);
    }

    #[test]
    fn linkage_cas_applies_once() {
        let (_dir, ledger) = temp_ledger();
        let account = ledger
            .create_account(test_account(
                "a@x.com",
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();

        ledger
            .commit_attempt(
                test_attempt(account.id, 42),
                Some(AccountLinkage {
                    account: account.id,
                    beneficiary: BeneficiaryId::new(42),
                }),
            )
            .unwrap();
        ledger
            .commit_attempt(
                test_attempt(account.id, 99),
                Some(AccountLinkage {
                    account: account.id,
                    beneficiary: BeneficiaryId::new(99),
                }),
            )
            .unwrap();

        assert_eq!(
            ledger.get_account(account.id).unwrap().beneficiary_id,
            BeneficiaryId::new(42)
        );
        assert_eq!(ledger.attempt_count().unwrap(), 2);
    }

    #[test]
    fn failed_commit_leaves_no_partial_state() {
        let (_dir, ledger) = temp_ledger();
        let account = ledger
            .create_account(test_account(
                "a@x.com",
                "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
            ))
            .unwrap();

        // Linkage against a missing account aborts the transaction.
        let err = ledger.commit_attempt(
            test_attempt(account.id, 42),
            Some(AccountLinkage {
                account: AccountId(999),
                beneficiary: BeneficiaryId::new(42),
            }),
        );
        assert!(matches!(err, Err(StoreError::NotFound(_))));
        assert_eq!(ledger.attempt_count().unwrap(), 0);

        // The aborted transaction did not burn an id.
        let attempt = ledger.commit_attempt(test_attempt(account.id, 42), None).unwrap();
        assert_eq!(attempt.id.as_u64(), 1);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let account_id;
        {
            let ledger = LmdbLedger::open_with_map_size(dir.path(), 10 * 1024 * 1024).unwrap();
            let account = ledger
                .create_account(test_account(
                    "a@x.com",
                    "0xaa44cdddb6a900fa2b585dd299e03d12fa4293bc",
                ))
                .unwrap();
            account_id = account.id;
            ledger
                .commit_attempt(
                    test_attempt(account.id, 42),
                    Some(AccountLinkage {
                        account: account.id,
                        beneficiary: BeneficiaryId::new(42),
                    }),
                )
                .unwrap();
        }

        let reopened = LmdbLedger::open_with_map_size(dir.path(), 10 * 1024 * 1024).unwrap();
        assert_eq!(
            reopened.get_account(account_id).unwrap().beneficiary_id,
            BeneficiaryId::new(42)
        );
        assert_eq!(reopened.attempts_for_account(account_id).unwrap().len(), 1);
    }
}
