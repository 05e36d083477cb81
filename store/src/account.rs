//! Account storage.

use crate::StoreError;
use pension_types::{AccountId, BeneficiaryId, Role, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Per-account row.
///
/// The credential hash is opaque to this service — authentication lives in
/// the external credential collaborator; the field is carried so accounts
/// seeded by other tooling round-trip unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    /// Unique login email.
    pub email: String,
    pub credential_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// ISO `YYYY-MM-DD`, uninterpreted.
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Unique external wallet reference, when linked.
    pub wallet: Option<WalletAddress>,
    pub role: Role,
    /// Bound at most once, by the verification engine, after the first
    /// successful live verification. Never overwritten thereafter.
    #[serde(default)]
    pub beneficiary_id: BeneficiaryId,
    pub created_at: Timestamp,
}

impl AccountRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An account before the backend has allocated its id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub credential_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub wallet: Option<WalletAddress>,
    pub role: Role,
    pub created_at: Timestamp,
}

impl NewAccount {
    pub fn into_record(self, id: AccountId) -> AccountRecord {
        AccountRecord {
            id,
            email: self.email,
            credential_hash: self.credential_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            wallet: self.wallet,
            role: self.role,
            beneficiary_id: BeneficiaryId::UNSET,
            created_at: self.created_at,
        }
    }
}

/// Trait for account storage operations.
pub trait AccountStore {
    fn get_account(&self, id: AccountId) -> Result<AccountRecord, StoreError>;
    fn find_by_wallet(&self, wallet: &WalletAddress) -> Result<Option<AccountRecord>, StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Allocate an id and persist a new account.
    ///
    /// Fails with [`StoreError::Duplicate`] when the email or wallet is
    /// already registered to another account.
    fn create_account(&self, account: NewAccount) -> Result<AccountRecord, StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;
    fn iter_accounts(&self) -> Result<Vec<AccountRecord>, StoreError>;
}
