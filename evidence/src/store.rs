//! The evidence store trait.

use std::path::PathBuf;

use pension_types::EvidenceRef;

use crate::EvidenceError;

/// Pluggable evidence persistence.
///
/// `store` must return a globally unique reference on every call, even for
/// byte-identical payloads under concurrent writers. The `tag` prefixes the
/// generated name so the two submission paths can never collide (`id`/`face`
/// for live uploads, `sync_id`/`sync_face` for reconciled ones).
pub trait EvidenceStore: Send + Sync {
    fn store(
        &self,
        bytes: &[u8],
        mime_hint: &str,
        tag: &str,
    ) -> Result<EvidenceRef, EvidenceError>;

    /// Resolve a reference to a local path or handle.
    fn resolve(&self, reference: &EvidenceRef) -> Result<PathBuf, EvidenceError>;
}

/// Map an accepted image media type to a file extension.
pub(crate) fn extension_for(mime_hint: &str) -> Result<&'static str, EvidenceError> {
    match mime_hint {
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/png" => Ok("png"),
        other => Err(EvidenceError::UnsupportedMediaType(other.to_string())),
    }
}
