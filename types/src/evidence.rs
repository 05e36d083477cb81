//! Opaque evidence handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a stored evidence image (identity document or live capture).
///
/// The reference is opaque to everything except the evidence store that
/// issued it. References are globally unique even for byte-identical inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
