//! LMDB implementation of AttemptStore.
//!
//! Per-account listing is a prefix range-scan over the composite-key index
//! `account_id_be ++ attempt_id_be`; big-endian ids make lexicographic key
//! order equal creation order.

use std::ops::Bound;

use pension_store::attempt::{AttemptStore, VerificationAttempt};
use pension_store::StoreError;
use pension_types::{AccountId, AttemptId};

use crate::ledger::LmdbLedger;
use crate::LmdbError;

impl AttemptStore for LmdbLedger {
    fn get_attempt(&self, id: AttemptId) -> Result<VerificationAttempt, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let raw = self
            .env
            .attempts_db
            .get(&rtxn, &id.as_u64().to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        bincode::deserialize(raw)
            .map_err(LmdbError::from)
            .map_err(StoreError::from)
    }

    fn attempts_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<VerificationAttempt>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;

        let lower = account.as_u64().to_be_bytes();
        let upper_key;
        let upper = match account.as_u64().checked_add(1) {
            Some(next) => {
                upper_key = next.to_be_bytes();
                Bound::Excluded(&upper_key[..])
            }
            None => Bound::Unbounded,
        };
        let bounds = (Bound::Included(&lower[..]), upper);

        let iter = self
            .env
            .account_attempts_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let mut attempts = Vec::new();
        for entry in iter {
            let (_key, raw_id) = entry.map_err(LmdbError::from)?;
            let raw = self
                .env
                .attempts_db
                .get(&rtxn, raw_id)
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption("attempt index points at a missing row".into())
                })?;
            attempts.push(bincode::deserialize(raw).map_err(LmdbError::from)?);
        }
        Ok(attempts)
    }

    fn attempt_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        self.env
            .attempts_db
            .len(&rtxn)
            .map_err(LmdbError::from)
            .map_err(StoreError::from)
    }
}
