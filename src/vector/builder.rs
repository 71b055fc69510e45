//! IndexBuilder: turns (chunk, vector) pairs into a published index.
//!
//! A build normalizes every vector, encodes every artifact in memory, and
//! only then touches the target directory
//! (see [`RecordStore::publish`]):
//!
//! 1. stage every new artifact and the new manifest under temporary names,
//! 2. remove the previous manifest (the directory is now "not built"),
//! 3. rename the vectors and metadata artifacts into place,
//! 4. rename the accelerated artifact into place, or remove a stale one,
//! 5. rename the new manifest into place.
//!
//! A reader that finds a manifest therefore finds the artifacts it describes.
//! A build that fails before step 2 leaves the previous build in service; one
//! that fails between steps 2 and 5 leaves the location unopenable until the
//! next successful build.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::embedding::embedder::{Embedder, ensure_batch_len};
use crate::error::{RagdexError, Result};
use crate::vector::core::record::ChunkRecord;
use crate::vector::core::vector::{Vector, is_finite, normalize_in_place};
use crate::vector::index::flat::{self, FlatIndex};
use crate::vector::store::RecordStore;
use crate::vector::store::config::IndexConfig;

/// Summary of a published build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub count: usize,
    pub dimension: usize,
    /// Whether the accelerated artifact was produced.
    pub accelerated: bool,
    pub location: PathBuf,
}

/// Builds and publishes an index directory.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Build an index from chunk records and their raw embeddings.
    pub fn build(
        &self,
        records: Vec<(ChunkRecord, Vector)>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BuildResult> {
        let out_dir = out_dir.as_ref();
        let store = normalize_records(records)?;
        let index = self.build_accelerated(&store);
        let index_bytes = index.as_ref().map(FlatIndex::to_bytes);
        store.publish(out_dir, &self.config.layout, index_bytes.as_deref())?;

        let result = BuildResult {
            count: store.len(),
            dimension: store.dimension(),
            accelerated: index.is_some(),
            location: out_dir.to_path_buf(),
        };
        info!(
            "built index at {} ({} records, dimension {}, accelerated: {})",
            out_dir.display(),
            result.count,
            result.dimension,
            result.accelerated
        );
        Ok(result)
    }

    /// Embed chunk texts in batches, then [`build`](IndexBuilder::build).
    pub async fn build_from_chunks(
        &self,
        chunks: Vec<ChunkRecord>,
        embedder: &dyn Embedder,
        out_dir: impl AsRef<Path>,
    ) -> Result<BuildResult> {
        if chunks.is_empty() {
            return Err(RagdexError::input("cannot build an index from zero chunks"));
        }

        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.embedding_batch) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let embedded = embedder.embed_many(&texts).await?;
            ensure_batch_len(embedder, texts.len(), embedded.len())?;
            vectors.extend(embedded);
            debug!(
                "embedded {}/{} chunks with {}",
                vectors.len(),
                chunks.len(),
                embedder.name()
            );
        }

        self.build(chunks.into_iter().zip(vectors).collect(), out_dir)
    }

    fn build_accelerated(&self, store: &RecordStore) -> Option<FlatIndex> {
        if !self.config.accelerate {
            info!("accelerated index disabled by configuration");
            return None;
        }
        if !flat::is_available() {
            info!("accelerated index support is not compiled in; building without it");
            return None;
        }
        match FlatIndex::build(store.dimension(), store.vectors().to_vec()) {
            Ok(index) => Some(index),
            Err(err) => {
                warn!("failed to build accelerated index, continuing without it: {err}");
                None
            }
        }
    }
}

/// Validate and normalize a batch into a record store.
fn normalize_records(records: Vec<(ChunkRecord, Vector)>) -> Result<RecordStore> {
    let Some((_, first)) = records.first() else {
        return Err(RagdexError::input("cannot build an index from zero records"));
    };
    let dimension = first.dimension();
    if dimension == 0 {
        return Err(RagdexError::input("vector dimension must be at least 1"));
    }

    let mut vectors = Vec::with_capacity(records.len() * dimension);
    let mut chunks = Vec::with_capacity(records.len());
    for (position, (record, vector)) in records.into_iter().enumerate() {
        if vector.dimension() != dimension {
            return Err(RagdexError::input(format!(
                "vector {position} has dimension {}, expected {dimension}",
                vector.dimension()
            )));
        }
        if !is_finite(vector.as_slice()) {
            return Err(RagdexError::input(format!(
                "vector {position} contains non-finite values"
            )));
        }
        let start = vectors.len();
        vectors.extend(vector.into_inner());
        normalize_in_place(&mut vectors[start..]);
        chunks.push(record);
    }

    RecordStore::new(dimension, vectors, chunks)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::vector::core::vector::l2_norm;

    fn record(i: usize) -> ChunkRecord {
        ChunkRecord::new(1, i * 10, i * 10 + 10, format!("chunk {i}"))
    }

    #[test]
    fn test_normalize_records() {
        let store = normalize_records(vec![
            (record(0), Vector::new(vec![3.0, 4.0])),
            (record(1), Vector::new(vec![0.0, 0.0])),
        ])
        .unwrap();
        assert!((l2_norm(store.vector(0).unwrap()) - 1.0).abs() < 1e-6);
        assert_eq!(store.vector(1).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_normalize_records_rejects_bad_input() {
        assert!(normalize_records(vec![]).unwrap_err().is_input());
        assert!(
            normalize_records(vec![(record(0), Vector::new(vec![]))])
                .unwrap_err()
                .is_input()
        );
        assert!(
            normalize_records(vec![
                (record(0), Vector::new(vec![1.0, 0.0])),
                (record(1), Vector::new(vec![1.0, 0.0, 0.0])),
            ])
            .unwrap_err()
            .is_input()
        );
        assert!(
            normalize_records(vec![(record(0), Vector::new(vec![f32::INFINITY, 0.0]))])
                .unwrap_err()
                .is_input()
        );
    }

    #[test]
    fn test_build_respects_accelerate_flag() {
        let dir = tempfile::Builder::new().prefix("test_builder").tempdir().unwrap();
        let config = IndexConfig::builder().accelerate(false).build().unwrap();
        let builder = IndexBuilder::new(config).unwrap();
        let result = builder
            .build(vec![(record(0), Vector::new(vec![1.0, 2.0]))], dir.path())
            .unwrap();

        assert!(!result.accelerated);
        assert_eq!(result.count, 1);
        assert_eq!(result.dimension, 2);
        assert!(!dir.path().join("index.flat").exists());
        assert!(dir.path().join("manifest.json").exists());
    }

    #[derive(Debug)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vector::new(vec![text.len() as f32, 1.0]))
        }

        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|text| Vector::new(vec![text.len() as f32, 1.0]))
                .collect())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_build_from_chunks_batches() {
        let dir = tempfile::Builder::new().prefix("test_builder").tempdir().unwrap();
        let config = IndexConfig::builder().embedding_batch(2).build().unwrap();
        let builder = IndexBuilder::new(config).unwrap();
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let chunks: Vec<ChunkRecord> = (0..5).map(record).collect();

        let result =
            tokio_test::block_on(builder.build_from_chunks(chunks, &embedder, dir.path())).unwrap();
        assert_eq!(result.count, 5);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_build_from_chunks_rejects_empty() {
        let dir = tempfile::Builder::new().prefix("test_builder").tempdir().unwrap();
        let embedder = CountingEmbedder {
            calls: AtomicUsize::new(0),
        };
        let err = tokio_test::block_on(IndexBuilder::default().build_from_chunks(
            vec![],
            &embedder,
            dir.path(),
        ))
        .unwrap_err();
        assert!(err.is_input());
    }
}
