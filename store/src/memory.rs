//! In-memory ledger backend.
//!
//! Backs the core engine tests and the daemon's `--ephemeral` mode. A single
//! mutex around the whole state gives the same serialized-writer guarantee
//! the LMDB backend gets from its write transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use pension_types::{AccountId, AttemptId, WalletAddress};

use crate::account::{AccountRecord, AccountStore, NewAccount};
use crate::attempt::{AttemptStore, NewAttempt, VerificationAttempt};
use crate::ledger::{AccountLinkage, Ledger};
use crate::StoreError;

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<u64, AccountRecord>,
    by_wallet: HashMap<String, u64>,
    by_email: HashMap<String, u64>,
    attempts: BTreeMap<u64, VerificationAttempt>,
    next_account_id: u64,
    next_attempt_id: u64,
}

/// Mutex-guarded in-memory implementation of [`Ledger`].
#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex means a panic mid-write; the state is unusable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AccountStore for MemoryLedger {
    fn get_account(&self, id: AccountId) -> Result<AccountRecord, StoreError> {
        self.lock()
            .accounts
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn find_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<AccountRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .by_wallet
            .get(wallet.as_str())
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    fn create_account(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let mut inner = self.lock();
        if inner.by_email.contains_key(&account.email) {
            return Err(StoreError::Duplicate(format!("email {}", account.email)));
        }
        if let Some(ref wallet) = account.wallet {
            if inner.by_wallet.contains_key(wallet.as_str()) {
                return Err(StoreError::Duplicate(format!("wallet {wallet}")));
            }
        }

        inner.next_account_id += 1;
        let record = account.into_record(AccountId(inner.next_account_id));
        inner.by_email.insert(record.email.clone(), record.id.as_u64());
        if let Some(ref wallet) = record.wallet {
            inner
                .by_wallet
                .insert(wallet.as_str().to_string(), record.id.as_u64());
        }
        inner.accounts.insert(record.id.as_u64(), record.clone());
        Ok(record)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock().accounts.len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Ok(self.lock().accounts.values().cloned().collect())
    }
}

impl AttemptStore for MemoryLedger {
    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError> {
        self.lock()
            .attempts
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn attempts_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<VerificationAttempt>, StoreError> {
        // BTreeMap iteration is id order, which is creation order.
        Ok(self
            .lock()
            .attempts
            .values()
            .filter(|a| a.account_id == account)
            .cloned()
            .collect())
    }

    fn attempt_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock().attempts.len() as u64)
    }
}

impl Ledger for MemoryLedger {
    fn commit_attempt(
        &self,
        attempt: NewAttempt,
        linkage: Option<AccountLinkage>,
    ) -> Result<VerificationAttempt, StoreError> {
        let mut inner = self.lock();

        // Validate everything before mutating, so a failed commit leaves no
        // partial state behind.
        if let Some(link) = linkage {
            if !inner.accounts.contains_key(&link.account.as_u64()) {
                return Err(StoreError::NotFound(link.account.to_string()));
            }
        }

        inner.next_attempt_id += 1;
        let attempt = attempt.into_attempt(AttemptId(inner.next_attempt_id));
        inner.attempts.insert(attempt.id.as_u64(), attempt.clone());

        if let Some(link) = linkage {
            // Compare-and-swap: only the first linkage for an account wins.
            if let Some(account) = inner.accounts.get_mut(&link.account.as_u64()) {
                if account.beneficiary_id.is_unset() {
                    account.beneficiary_id = link.beneficiary;
                }
            }
        }

        Ok(attempt)
    }
}
