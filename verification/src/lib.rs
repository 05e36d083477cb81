//! Verification lifecycle & recurrence engine.
//!
//! A verification attempt moves from evidence intake through a decision to a
//! terminal outcome in one request:
//! 1. **Intake**: supplied images are persisted via the evidence store.
//! 2. **Decision**: with both images present the identity matcher rules; with
//!    one image the attempt enrolls unconditionally (there is nothing to
//!    match against yet).
//! 3. **Commit**: the attempt row and the one-time beneficiary linkage go
//!    through a single ledger transaction.
//! 4. **Scheduling**: a successful outcome carries the next re-verification
//!    deadline (`now + cadence`).
//!
//! The matcher is modular — the engine specifies *that* identities must
//! agree, not *how*. The offline path ([`SyncReconciler`]) feeds reconciled
//! submissions through the same commit path but auto-approves stored
//! evidence, trusting the offline client's own check.

pub mod datauri;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod reconciler;
pub mod scheduler;

pub use engine::{EvidenceUpload, LiveSubmission, VerificationEngine};
pub use error::VerificationError;
pub use matcher::{AlwaysMatch, IdentityMatcher, MatchContext, MatcherError};
pub use reconciler::{SyncPayload, SyncReconciler};
