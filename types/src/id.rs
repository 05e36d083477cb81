//! Identifier newtypes.
//!
//! Account and attempt ids are allocated by the ledger backend from a
//! monotonic sequence. The beneficiary id is an external identifier linking
//! an account to a real-world pension recipient; `0` is the "unset" sentinel
//! carried by clients that do not yet know their id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal identifier of an account row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// Internal identifier of a verification attempt row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

impl AttemptId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt:{}", self.0)
    }
}

/// The stable external identifier of a pension beneficiary.
///
/// `UNSET` (zero) is the sentinel submitted by clients that have not been
/// assigned an id yet. An account's beneficiary id is bound at most once, by
/// the verification engine, after a successful live verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeneficiaryId(pub u64);

impl BeneficiaryId {
    /// The "not assigned yet" sentinel.
    pub const UNSET: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// Parse from a decimal string, treating empty input as the sentinel.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return Some(Self::UNSET);
        }
        raw.trim().parse::<u64>().ok().map(Self)
    }
}

impl Default for BeneficiaryId {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for BeneficiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sentinel_is_zero() {
        assert!(BeneficiaryId::UNSET.is_unset());
        assert!(BeneficiaryId::new(0).is_unset());
        assert!(!BeneficiaryId::new(42).is_unset());
    }

    #[test]
    fn parse_handles_empty_and_garbage() {
        assert_eq!(BeneficiaryId::parse(""), Some(BeneficiaryId::UNSET));
        assert_eq!(BeneficiaryId::parse("  "), Some(BeneficiaryId::UNSET));
        assert_eq!(BeneficiaryId::parse("42"), Some(BeneficiaryId(42)));
        assert_eq!(BeneficiaryId::parse(" 7 "), Some(BeneficiaryId(7)));
        assert_eq!(BeneficiaryId::parse("abc"), None);
    }
}
