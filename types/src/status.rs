//! Verification attempt lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of a verification attempt.
///
/// `Pending` is the default an attempt carries between intake and decision;
/// it is always overwritten synchronously within the same request and never
/// persists across requests. Outcomes are immutable once committed —
/// corrections are new attempts, never mutations of history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    /// Intake default, resolved before the attempt is committed.
    #[default]
    Pending,
    /// Live submission passed the identity check.
    Verified,
    /// Offline submission accepted through reconciliation.
    Approved,
    /// The identity check failed or no usable evidence was supplied.
    Rejected,
}

impl AttemptStatus {
    /// Whether this outcome counts as a successful verification.
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptStatus::Verified | AttemptStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::Verified => "verified",
            AttemptStatus::Approved => "approved",
            AttemptStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
