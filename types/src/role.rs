//! Account roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an account holds within the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A pension recipient subject to periodic liveness verification.
    Beneficiary,
    /// Back-office staff.
    Administrator,
    /// Medical staff performing assisted (offline) verifications.
    Clinician,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Beneficiary => "beneficiary",
            Role::Administrator => "administrator",
            Role::Clinician => "clinician",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
