//! Build manifest.
//!
//! The manifest is the commit marker of a build: the builder removes the old
//! one before touching any artifact and publishes the new one last. It
//! records the row count, dimension and a CRC32 of every artifact so an
//! engine can tell a consistent build from a mix of two.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RagdexError, Result};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub version: u32,
    pub count: usize,
    pub dimension: usize,
    /// Whether the accelerated artifact belongs to this build.
    pub accelerated: bool,
    pub built_at: DateTime<Utc>,
    /// Artifact file name -> CRC32 of its bytes.
    pub checksums: BTreeMap<String, u32>,
}

impl BuildManifest {
    pub fn new(count: usize, dimension: usize) -> Self {
        Self {
            version: MANIFEST_VERSION,
            count,
            dimension,
            accelerated: false,
            built_at: Utc::now(),
            checksums: BTreeMap::new(),
        }
    }

    pub fn checksum(bytes: &[u8]) -> u32 {
        crc32fast::hash(bytes)
    }

    /// Record the checksum of an artifact about to be published.
    pub fn record(&mut self, name: &str, bytes: &[u8]) {
        self.checksums
            .insert(name.to_string(), Self::checksum(bytes));
    }

    /// Check artifact bytes against the recorded checksum.
    pub fn verify(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let expected = self.checksums.get(name).ok_or_else(|| {
            RagdexError::corrupt(format!("manifest has no checksum for '{name}'"))
        })?;
        let actual = Self::checksum(bytes);
        if *expected != actual {
            return Err(RagdexError::corrupt(format!(
                "checksum mismatch for '{name}': manifest {expected:08x}, file {actual:08x}"
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let manifest: BuildManifest = serde_json::from_slice(bytes)
            .map_err(|err| RagdexError::corrupt(format!("unreadable manifest: {err}")))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(RagdexError::corrupt(format!(
                "manifest version mismatch: expected {}, found {}",
                MANIFEST_VERSION, manifest.version
            )));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let mut manifest = BuildManifest::new(3, 4);
        manifest.record("meta.json", b"[]");
        assert!(manifest.verify("meta.json", b"[]").is_ok());
        assert!(manifest.verify("meta.json", b"[ ]").unwrap_err().is_corrupt());
        assert!(manifest.verify("other", b"[]").unwrap_err().is_corrupt());
    }

    #[test]
    fn test_bytes_roundtrip_and_version_check() {
        let mut manifest = BuildManifest::new(10, 384);
        manifest.accelerated = true;
        manifest.record("embeddings.npy", b"abc");
        let decoded = BuildManifest::from_bytes(&manifest.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, manifest);

        let mut future = manifest.clone();
        future.version = MANIFEST_VERSION + 1;
        let err = BuildManifest::from_bytes(&future.to_bytes().unwrap()).unwrap_err();
        assert!(err.is_corrupt());
    }
}
