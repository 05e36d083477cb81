//! Service parameters — deployment-tunable values.
//!
//! Everything here can be set from the daemon's TOML config without code
//! changes.

use serde::{Deserialize, Serialize};

/// Tunable parameters carried by the verification engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceParams {
    /// Interval between mandatory re-verifications, in days.
    pub verification_cadence_days: u32,

    /// Maximum accepted size of one evidence image, in bytes.
    pub max_image_bytes: usize,
}

impl ServiceParams {
    /// Default cadence: re-verify every 180 days.
    pub const DEFAULT_CADENCE_DAYS: u32 = 180;

    pub fn defaults() -> Self {
        Self {
            verification_cadence_days: Self::DEFAULT_CADENCE_DAYS,
            max_image_bytes: 8 * 1024 * 1024,
        }
    }
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self::defaults()
    }
}
