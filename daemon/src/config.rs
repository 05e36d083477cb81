//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use pension_types::ServiceParams;

/// Configuration for the verification service.
///
/// Can be loaded from a TOML file (file settings are the base; CLI flags and
/// env vars override them) or built programmatically for tests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory for the LMDB ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for stored evidence images.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// RPC server port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Interval between mandatory re-verifications, in days.
    #[serde(default = "default_cadence_days")]
    pub verification_cadence_days: u32,

    /// Maximum accepted evidence image size, in megabytes.
    #[serde(default = "default_max_image_mb")]
    pub max_image_mb: usize,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Run with an in-memory ledger instead of LMDB (data dies with the
    /// process; local development only).
    #[serde(default)]
    pub ephemeral: bool,
}

impl ServiceConfig {
    pub fn params(&self) -> ServiceParams {
        ServiceParams {
            verification_cadence_days: self.verification_cadence_days,
            max_image_bytes: self.max_image_mb * 1024 * 1024,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            uploads_dir: default_uploads_dir(),
            rpc_port: default_rpc_port(),
            verification_cadence_days: default_cadence_days(),
            max_image_mb: default_max_image_mb(),
            log_level: default_log_level(),
            ephemeral: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./pension_data")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./pension_data/uploads")
}

fn default_rpc_port() -> u16 {
    5000
}

fn default_cadence_days() -> u32 {
    ServiceParams::DEFAULT_CADENCE_DAYS
}

fn default_max_image_mb() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}
