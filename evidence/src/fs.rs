//! Filesystem evidence store.

use std::fs;
use std::path::{Path, PathBuf};

use pension_types::EvidenceRef;
use uuid::Uuid;

use crate::store::{extension_for, EvidenceStore};
use crate::EvidenceError;

/// Stores evidence images as `{tag}_{uuid}.{ext}` under one uploads root.
///
/// The uuid component makes every reference unique regardless of payload or
/// concurrent writers; the reference is the bare file name, so the root can
/// be relocated without rewriting the ledger.
pub struct FsEvidenceStore {
    root: PathBuf,
    max_bytes: usize,
}

impl FsEvidenceStore {
    /// Open the store, creating the uploads directory if needed.
    pub fn open(root: impl Into<PathBuf>, max_bytes: usize) -> Result<Self, EvidenceError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_payload(&self, bytes: &[u8]) -> Result<(), EvidenceError> {
        if bytes.is_empty() {
            return Err(EvidenceError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(EvidenceError::TooLarge {
                got: bytes.len(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl EvidenceStore for FsEvidenceStore {
    fn store(
        &self,
        bytes: &[u8],
        mime_hint: &str,
        tag: &str,
    ) -> Result<EvidenceRef, EvidenceError> {
        self.check_payload(bytes)?;
        let ext = extension_for(mime_hint)?;
        let name = format!("{}_{}.{}", tag, Uuid::new_v4(), ext);
        let path = self.root.join(&name);
        fs::write(&path, bytes)?;
        tracing::debug!(file = %name, bytes = bytes.len(), "stored evidence");
        Ok(EvidenceRef::new(name))
    }

    fn resolve(&self, reference: &EvidenceRef) -> Result<PathBuf, EvidenceError> {
        // References are bare file names; reject anything that tries to
        // escape the uploads root.
        let name = reference.as_str();
        if name.contains('/') || name.contains("..") {
            return Err(EvidenceError::UnknownReference(name.to_string()));
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(EvidenceError::UnknownReference(name.to_string()));
        }
        Ok(path)
    }
}
