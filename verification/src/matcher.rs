//! Modular identity matcher trait.
//!
//! The engine does not specify HOW two evidence images are compared — only
//! that a comparison verdict is needed when both are present. A real
//! biometric backend slots in without touching the orchestration.

use pension_types::{BeneficiaryId, EvidenceRef};
use thiserror::Error;

/// Context handed to the matcher alongside the two evidence references.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext {
    pub beneficiary_id: BeneficiaryId,
}

#[derive(Debug, Error)]
pub enum MatcherError {
    /// The matching backend could not produce a verdict. The engine treats
    /// this as a rejection, never as a pass.
    #[error("identity matcher unavailable: {0}")]
    Unavailable(String),
}

/// A pluggable identity matcher.
///
/// Implementations might include a real face-recognition backend, a
/// document-OCR cross-check, or an external vendor API.
pub trait IdentityMatcher: Send + Sync {
    /// Human-readable name of this matcher.
    fn name(&self) -> &str;

    /// Whether the live capture and the identity document show the same
    /// person.
    fn compare(
        &self,
        live: &EvidenceRef,
        document: &EvidenceRef,
        ctx: &MatchContext,
    ) -> Result<bool, MatcherError>;
}

/// Development stub: every comparison passes.
///
/// Kept as a swappable capability so deployments can substitute a real
/// backend without engine changes.
pub struct AlwaysMatch;

impl IdentityMatcher for AlwaysMatch {
    fn name(&self) -> &str {
        "always-match"
    }

    fn compare(
        &self,
        live: &EvidenceRef,
        document: &EvidenceRef,
        ctx: &MatchContext,
    ) -> Result<bool, MatcherError> {
        tracing::debug!(
            live = %live,
            document = %document,
            beneficiary = %ctx.beneficiary_id,
            "stub matcher comparing evidence"
        );
        Ok(true)
    }
}
