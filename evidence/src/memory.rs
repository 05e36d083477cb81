//! In-memory evidence store for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use pension_types::EvidenceRef;
use uuid::Uuid;

use crate::store::{extension_for, EvidenceStore};
use crate::EvidenceError;

/// Keeps payloads in a map; references resolve to synthetic paths.
#[derive(Default)]
pub struct MemoryEvidenceStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs stored so far.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored payload (test assertions).
    pub fn get(&self, reference: &EvidenceRef) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(reference.as_str())
            .cloned()
    }
}

impl EvidenceStore for MemoryEvidenceStore {
    fn store(
        &self,
        bytes: &[u8],
        mime_hint: &str,
        tag: &str,
    ) -> Result<EvidenceRef, EvidenceError> {
        if bytes.is_empty() {
            return Err(EvidenceError::Empty);
        }
        let ext = extension_for(mime_hint)?;
        let name = format!("{}_{}.{}", tag, Uuid::new_v4(), ext);
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone(), bytes.to_vec());
        Ok(EvidenceRef::new(name))
    }

    fn resolve(&self, reference: &EvidenceRef) -> Result<PathBuf, EvidenceError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        if !blobs.contains_key(reference.as_str()) {
            return Err(EvidenceError::UnknownReference(
                reference.as_str().to_string(),
            ));
        }
        Ok(PathBuf::from(format!("mem://{}", reference.as_str())))
    }
}
