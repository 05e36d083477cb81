//! Abstract storage traits for the pension verification service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod account;
pub mod attempt;
pub mod error;
pub mod ledger;
pub mod memory;

pub use account::{AccountRecord, AccountStore, NewAccount};
pub use attempt::{AttemptStore, NewAttempt, VerificationAttempt};
pub use error::StoreError;
pub use ledger::{AccountLinkage, Ledger};
pub use memory::MemoryLedger;
