//! Evidence store capability.
//!
//! Persists binary image payloads under unique generated names and returns a
//! stable, opaque [`EvidenceRef`](pension_types::EvidenceRef). Two backends:
//! the filesystem store used by the daemon and an in-memory store for tests.
//!
//! Evidence writes are deliberately not transactional with the ledger: a blob
//! written before a later ledger failure becomes an orphan, which is an
//! accepted leak rather than a correctness violation.

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use error::EvidenceError;
pub use fs::FsEvidenceStore;
pub use memory::MemoryEvidenceStore;
pub use store::EvidenceStore;
