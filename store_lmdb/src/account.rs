//! LMDB implementation of AccountStore.

use pension_store::account::{AccountRecord, AccountStore, NewAccount};
use pension_store::StoreError;
use pension_types::{AccountId, WalletAddress};

use crate::ledger::{LmdbLedger, SEQ_ACCOUNT};
use crate::LmdbError;

impl LmdbLedger {
    fn account_by_index(
        &self,
        rtxn: &heed::RoTxn<'_>,
        index: &heed::Database<heed::types::Bytes, heed::types::Bytes>,
        key: &[u8],
    ) -> Result<Option<AccountRecord>, LmdbError> {
        let Some(raw_id) = index.get(rtxn, key)? else {
            return Ok(None);
        };
        match self.env.accounts_db.get(rtxn, raw_id)? {
            Some(raw) => Ok(Some(bincode::deserialize(raw)?)),
            // Index entry without a row means the database is inconsistent.
            None => Err(LmdbError::NotFound("indexed account row".into())),
        }
    }
}

impl AccountStore for LmdbLedger {
    fn get_account(&self, id: AccountId) -> Result<AccountRecord, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let raw = self
            .env
            .accounts_db
            .get(&rtxn, &id.as_u64().to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        bincode::deserialize(raw)
            .map_err(LmdbError::from)
            .map_err(StoreError::from)
    }

    fn find_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<AccountRecord>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        self.account_by_index(&rtxn, &self.env.wallet_index_db, wallet.as_str().as_bytes())
            .map_err(StoreError::from)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        self.account_by_index(&rtxn, &self.env.email_index_db, email.as_bytes())
            .map_err(StoreError::from)
    }

    fn create_account(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let env = &self.env;
        let mut wtxn = env.env.write_txn().map_err(LmdbError::from)?;

        if env
            .email_index_db
            .get(&wtxn, account.email.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("email {}", account.email)));
        }
        if let Some(ref wallet) = account.wallet {
            if env
                .wallet_index_db
                .get(&wtxn, wallet.as_str().as_bytes())
                .map_err(LmdbError::from)?
                .is_some()
            {
                return Err(StoreError::Duplicate(format!("wallet {wallet}")));
            }
        }

        let id = env.bump_sequence(&mut wtxn, SEQ_ACCOUNT)?;
        let record = account.into_record(AccountId(id));
        let id_bytes = id.to_be_bytes();

        let raw = bincode::serialize(&record).map_err(LmdbError::from)?;
        env.accounts_db
            .put(&mut wtxn, &id_bytes, &raw)
            .map_err(LmdbError::from)?;
        env.email_index_db
            .put(&mut wtxn, record.email.as_bytes(), &id_bytes)
            .map_err(LmdbError::from)?;
        if let Some(ref wallet) = record.wallet {
            env.wallet_index_db
                .put(&mut wtxn, wallet.as_str().as_bytes(), &id_bytes)
                .map_err(LmdbError::from)?;
        }

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(record)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        self.env
            .accounts_db
            .len(&rtxn)
            .map_err(LmdbError::from)
            .map_err(StoreError::from)
    }

    fn iter_accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.env.accounts_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut accounts = Vec::new();
        for entry in iter {
            let (_key, raw) = entry.map_err(LmdbError::from)?;
            accounts.push(bincode::deserialize(raw).map_err(LmdbError::from)?);
        }
        Ok(accounts)
    }
}
