//! Demo account seeding for local development.

use pension_store::{AccountStore, NewAccount, StoreError};
use pension_types::{Role, Timestamp, WalletAddress};

/// Create one demo account per role, skipping any that already exist.
pub fn create_demo_accounts<S: AccountStore + ?Sized>(store: &S) -> anyhow::Result<()> {
    let demos = [
        (
            "pensioner@smartpension.com",
            "John",
            "Doe",
            Role::Beneficiary,
            "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
        ),
        (
            "admin@smartpension.com",
            "Admin",
            "User",
            Role::Administrator,
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        ),
        (
            "doctor@smartpension.com",
            "Dr",
            "Smith",
            Role::Clinician,
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
        ),
    ];

    for (email, first, last, role, wallet) in demos {
        let wallet = WalletAddress::new(wallet);
        debug_assert!(wallet.is_valid());
        let result = store.create_account(NewAccount {
            email: email.into(),
            credential_hash: None,
            first_name: first.into(),
            last_name: last.into(),
            phone: None,
            date_of_birth: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            wallet: Some(wallet),
            role,
            created_at: Timestamp::now(),
        });
        match result {
            Ok(account) => {
                tracing::info!(email, id = account.id.as_u64(), role = %role, "demo account created")
            }
            Err(StoreError::Duplicate(_)) => {
                tracing::info!(email, "demo account already exists, skipping")
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pension_store::MemoryLedger;

    #[test]
    fn seeding_is_idempotent() {
        let ledger = MemoryLedger::new();
        create_demo_accounts(&ledger).unwrap();
        create_demo_accounts(&ledger).unwrap();
        assert_eq!(ledger.account_count().unwrap(), 3);
    }

    #[test]
    fn demo_beneficiary_starts_unlinked() {
        let ledger = MemoryLedger::new();
        create_demo_accounts(&ledger).unwrap();
        let account = ledger
            .find_by_email("pensioner@smartpension.com")
            .unwrap()
            .expect("seeded account");
        assert_eq!(account.role, Role::Beneficiary);
        assert!(account.beneficiary_id.is_unset());
    }
}
