//! RecordStore: positional storage of (vector, chunk) pairs.
//!
//! Position `i` of the store is row `i` of the vectors artifact and element
//! `i` of the metadata artifact. It is also the label the accelerated index
//! reports, so all three must stay in lock-step.
//!
//! # Module Structure
//!
//! - [`config`] - Artifact layout and index configuration
//! - [`manifest`] - Build manifest (commit marker + checksums)
//! - [`npy`] - `.npy` codec for the vectors artifact

pub mod config;
pub mod manifest;
pub mod npy;

use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::{RagdexError, Result};
use crate::storage::FileStorage;
use crate::util::id::is_chunk_id;
use crate::vector::core::record::ChunkRecord;

use self::config::ArtifactLayout;
use self::manifest::BuildManifest;

/// Normalized vectors and their chunk payloads in positional order.
#[derive(Clone, PartialEq)]
pub struct RecordStore {
    dimension: usize,
    /// Row-major `len() x dimension`.
    vectors: Vec<f32>,
    records: Vec<ChunkRecord>,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("dimension", &self.dimension)
            .field("len", &self.records.len())
            .finish()
    }
}

impl RecordStore {
    /// Create a store from a row-major vector buffer and its records.
    pub fn new(dimension: usize, vectors: Vec<f32>, records: Vec<ChunkRecord>) -> Result<Self> {
        if dimension == 0 {
            return Err(RagdexError::input("vector dimension must be at least 1"));
        }
        if vectors.len() != dimension * records.len() {
            return Err(RagdexError::input(format!(
                "vector buffer holds {} values, {} records of dimension {} need {}",
                vectors.len(),
                records.len(),
                dimension,
                dimension * records.len()
            )));
        }
        Ok(Self {
            dimension,
            vectors,
            records,
        })
    }

    /// Load a store written with the default layout.
    pub fn load(location: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_layout(location, &ArtifactLayout::default())
    }

    pub fn load_with_layout(location: impl AsRef<Path>, layout: &ArtifactLayout) -> Result<Self> {
        let storage = FileStorage::new(location.as_ref());
        let vectors = storage.read(&layout.vectors)?;
        let metadata = storage.read(&layout.metadata)?;
        Self::decode(&vectors, &metadata)
    }

    /// Decode the two artifacts. Row and record counts must agree.
    pub fn decode(vectors_bytes: &[u8], metadata_bytes: &[u8]) -> Result<Self> {
        let (rows, dimension, vectors) = npy::decode_f32_matrix(vectors_bytes)?;
        let records: Vec<ChunkRecord> = serde_json::from_slice(metadata_bytes)
            .map_err(|err| RagdexError::corrupt(format!("unreadable metadata: {err}")))?;

        if rows != records.len() {
            return Err(RagdexError::corrupt(format!(
                "vector count {} does not match metadata count {}",
                rows,
                records.len()
            )));
        }
        if dimension == 0 && rows > 0 {
            return Err(RagdexError::corrupt("stored vectors have dimension 0"));
        }
        if let Some((position, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| !is_chunk_id(&record.chunk_id))
        {
            return Err(RagdexError::corrupt(format!(
                "metadata record {position} has malformed chunk id '{}'",
                record.chunk_id
            )));
        }

        Ok(Self {
            dimension,
            vectors,
            records,
        })
    }

    /// Save with the default layout.
    pub fn save(&self, location: impl AsRef<Path>) -> Result<()> {
        self.save_with_layout(location, &ArtifactLayout::default())
    }

    /// Publish the store as a complete build without an accelerated artifact.
    ///
    /// The result opens with [`SearchEngine::open`](crate::SearchEngine::open)
    /// in brute-force mode. Loading a directory that holds only the vectors
    /// and metadata artifacts and saving it back adopts it as a build.
    pub fn save_with_layout(&self, location: impl AsRef<Path>, layout: &ArtifactLayout) -> Result<()> {
        self.publish(location, layout, None).map(|_| ())
    }

    /// Publish the store, and optionally an accelerated artifact, at `location`.
    ///
    /// Every artifact and the manifest are staged before the live build is
    /// touched, so a failure while encoding or writing leaves the previous
    /// build openable. Then the old manifest is removed, the artifacts are
    /// renamed into place and the new manifest is committed last. A failure
    /// during the renames leaves no manifest, which readers treat as not built.
    pub fn publish(
        &self,
        location: impl AsRef<Path>,
        layout: &ArtifactLayout,
        accelerated: Option<&[u8]>,
    ) -> Result<BuildManifest> {
        let storage = FileStorage::new(location.as_ref());
        let vectors_bytes = self.encode_vectors();
        let metadata_bytes = self.encode_metadata()?;

        let mut manifest = BuildManifest::new(self.len(), self.dimension);
        manifest.record(&layout.vectors, &vectors_bytes);
        manifest.record(&layout.metadata, &metadata_bytes);
        if let Some(bytes) = accelerated {
            manifest.record(&layout.accelerated, bytes);
            manifest.accelerated = true;
        }

        storage.ensure_dir()?;
        let vectors = storage.stage(&layout.vectors, &vectors_bytes)?;
        let metadata = storage.stage(&layout.metadata, &metadata_bytes)?;
        let index = accelerated
            .map(|bytes| storage.stage(&layout.accelerated, bytes))
            .transpose()?;
        let manifest_file = storage.stage(&layout.manifest, &manifest.to_bytes()?)?;

        storage.remove(&layout.manifest)?;
        storage.commit(vectors)?;
        storage.commit(metadata)?;
        match index {
            Some(index) => storage.commit(index)?,
            None => {
                if storage.remove(&layout.accelerated)? {
                    debug!(
                        "removed stale accelerated index from {}",
                        storage.root().display()
                    );
                }
            }
        }
        storage.commit(manifest_file)?;
        Ok(manifest)
    }

    pub fn encode_vectors(&self) -> Vec<u8> {
        npy::encode_f32_matrix(self.len(), self.dimension, &self.vectors)
    }

    pub fn encode_metadata(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The vector stored at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.vectors[start..start + self.dimension])
    }

    pub fn record(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    /// The whole row-major vector buffer.
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// Iterate `(position, vector, record)` in store order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32], &ChunkRecord)> {
        self.vectors
            .chunks_exact(self.dimension.max(1))
            .zip(self.records.iter())
            .enumerate()
            .map(|(position, (vector, record))| (position, vector, record))
    }

    pub fn into_parts(self) -> (usize, Vec<f32>, Vec<ChunkRecord>) {
        (self.dimension, self.vectors, self.records)
    }
}
