//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RwTxn};

use crate::LmdbError;

/// Wraps the LMDB environment and all database handles.
///
/// Databases:
/// - `accounts`          — account id (u64 BE) → bincode `AccountRecord`
/// - `wallet_index`      — wallet string → account id (u64 BE)
/// - `email_index`       — email string → account id (u64 BE)
/// - `attempts`          — attempt id (u64 BE) → bincode `VerificationAttempt`
/// - `account_attempts`  — account id BE ++ attempt id BE → attempt id BE
///                         (creation-order prefix scans per account)
/// - `meta`              — id sequences and schema version
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) wallet_index_db: Database<Bytes, Bytes>,
    pub(crate) email_index_db: Database<Bytes, Bytes>,
    pub(crate) attempts_db: Database<Bytes, Bytes>,
    pub(crate) account_attempts_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Default map size: 1 GiB, plenty for attempt rows (images live in the
/// evidence store, not here).
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

const MAX_DBS: u32 = 8;

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("cannot create data dir: {e}")))?;

        // Safety contract: the path is not opened twice within one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let accounts_db = env.create_database(&mut wtxn, Some("accounts"))?;
        let wallet_index_db = env.create_database(&mut wtxn, Some("wallet_index"))?;
        let email_index_db = env.create_database(&mut wtxn, Some("email_index"))?;
        let attempts_db = env.create_database(&mut wtxn, Some("attempts"))?;
        let account_attempts_db = env.create_database(&mut wtxn, Some("account_attempts"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            accounts_db,
            wallet_index_db,
            email_index_db,
            attempts_db,
            account_attempts_db,
            meta_db,
        })
    }

    /// Allocate the next value of a monotonic id sequence, inside the
    /// caller's write transaction so allocation commits or rolls back with
    /// the rest of the batch.
    pub(crate) fn bump_sequence(
        &self,
        wtxn: &mut RwTxn<'_>,
        key: &[u8],
    ) -> Result<u64, LmdbError> {
        let current = match self.meta_db.get(wtxn, key)? {
            Some(raw) => {
                let bytes: [u8; 8] = raw
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("sequence value width".into()))?;
                u64::from_be_bytes(bytes)
            }
            None => 0,
        };
        let next = current + 1;
        self.meta_db.put(wtxn, key, &next.to_be_bytes())?;
        Ok(next)
    }
}
