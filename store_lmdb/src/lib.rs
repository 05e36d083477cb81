//! LMDB storage backend for the pension verification service.
//!
//! Implements the storage traits from `pension-store` using the `heed` LMDB
//! bindings. All databases live in a single environment; LMDB serializes
//! write transactions, which is what makes `commit_attempt`'s
//! read-linkage → decide → write sequence atomic under concurrent
//! submissions.

pub mod account;
pub mod attempt;
pub mod environment;
pub mod error;
pub mod ledger;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use ledger::LmdbLedger;
