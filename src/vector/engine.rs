//! SearchEngine: top-k similarity search over a built index directory.
//!
//! The engine is opened once from the artifacts an
//! [`IndexBuilder`](crate::vector::builder::IndexBuilder) published, chooses
//! its search strategy at that point, and is immutable afterwards. Both
//! strategies score with the same dot product over the same normalized
//! vectors and rank with the same comparator, so they return the same hits.
//!
//! # Module Structure
//!
//! - [`cell`] - Lazily opened, shared engine handle
//! - [`request`] - Search options

pub mod cell;
pub mod request;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{RagdexError, Result};
use crate::storage::FileStorage;
use crate::vector::core::record::ChunkRecord;
use crate::vector::core::vector::{is_finite, normalize};
use crate::vector::index::flat::{self, FlatIndex, FlatSearchResult};
use crate::vector::search::brute_force;
use crate::vector::search::ranking::ScoredPosition;
use crate::vector::store::RecordStore;
use crate::vector::store::config::{ArtifactLayout, IndexConfig};
use crate::vector::store::manifest::BuildManifest;

use self::request::SearchOptions;

/// Which strategy an engine answers queries with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Accelerated,
    BruteForce,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Accelerated => write!(f, "accelerated"),
            SearchMode::BruteForce => write!(f, "brute_force"),
        }
    }
}

enum SearchStrategy {
    Accelerated(FlatIndex),
    BruteForce,
}

impl SearchStrategy {
    fn mode(&self) -> SearchMode {
        match self {
            SearchStrategy::Accelerated(_) => SearchMode::Accelerated,
            SearchStrategy::BruteForce => SearchMode::BruteForce,
        }
    }
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Position in the record store.
    pub position: usize,
    /// Cosine similarity to the query.
    pub score: f32,
    #[serde(flatten)]
    pub record: ChunkRecord,
    /// Stored normalized embedding, only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Read-only search engine over one built index.
pub struct SearchEngine {
    location: Option<PathBuf>,
    config: IndexConfig,
    store: RecordStore,
    manifest: Option<BuildManifest>,
    strategy: SearchStrategy,
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("location", &self.location)
            .field("len", &self.store.len())
            .field("dimension", &self.store.dimension())
            .field("mode", &self.mode())
            .finish()
    }
}

impl SearchEngine {
    /// Open the index at `location` with the default artifact layout.
    pub fn open(location: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(location, IndexConfig::default())
    }

    /// Open the index at `location`.
    ///
    /// The vectors artifact, the metadata artifact and the manifest must all
    /// exist. The manifest is published last by every writer, so its absence
    /// means the build is missing or was interrupted. A directory holding only
    /// the two data artifacts can be adopted with [`RecordStore::load`] and
    /// [`RecordStore::save`]. The accelerated artifact is optional; when it
    /// cannot be used the engine falls back to brute force and says so in
    /// the log.
    pub fn open_with_config(location: impl AsRef<Path>, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let location = location.as_ref();
        let layout = &config.layout;
        let storage = FileStorage::new(location);

        let vectors_bytes = storage.read(&layout.vectors)?;
        let metadata_bytes = storage.read(&layout.metadata)?;
        let manifest_bytes = storage.read(&layout.manifest).map_err(|err| {
            if err.is_not_found() {
                RagdexError::not_found(format!(
                    "{} has no build manifest; the build is missing or incomplete",
                    location.display()
                ))
            } else {
                err
            }
        })?;
        let manifest = BuildManifest::from_bytes(&manifest_bytes)?;

        manifest.verify(&layout.vectors, &vectors_bytes)?;
        manifest.verify(&layout.metadata, &metadata_bytes)?;
        let store = RecordStore::decode(&vectors_bytes, &metadata_bytes)?;

        if manifest.count != store.len() || manifest.dimension != store.dimension() {
            return Err(RagdexError::corrupt(format!(
                "manifest describes {} x {} vectors, store holds {} x {}",
                manifest.count,
                manifest.dimension,
                store.len(),
                store.dimension()
            )));
        }

        let strategy = select_strategy(&storage, layout, &manifest, &store);
        info!(
            "opened index at {} ({} records, dimension {}, {} search)",
            location.display(),
            store.len(),
            store.dimension(),
            strategy.mode()
        );

        Ok(Self {
            location: Some(location.to_path_buf()),
            config,
            store,
            manifest: Some(manifest),
            strategy,
        })
    }

    /// Build an engine over an in-memory store.
    ///
    /// The store must already hold normalized vectors. When `index` is given
    /// it must cover the same rows as the store.
    pub fn with_index(store: RecordStore, index: Option<FlatIndex>) -> Result<Self> {
        let strategy = match index {
            Some(index) => {
                if index.len() != store.len() || index.dimension() != store.dimension() {
                    return Err(RagdexError::input(format!(
                        "flat index holds {} x {} vectors, store holds {} x {}",
                        index.len(),
                        index.dimension(),
                        store.len(),
                        store.dimension()
                    )));
                }
                SearchStrategy::Accelerated(index)
            }
            None => SearchStrategy::BruteForce,
        };

        Ok(Self {
            location: None,
            config: IndexConfig::default(),
            store,
            manifest: None,
            strategy,
        })
    }

    /// Return the `top_k` most similar records to `query`.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Hit>> {
        self.search_with(query, &SearchOptions::new(top_k))
    }

    pub fn search_with(&self, query: &[f32], options: &SearchOptions) -> Result<Vec<Hit>> {
        if options.top_k == 0 {
            return Err(RagdexError::input("top_k must be at least 1"));
        }
        if query.len() != self.store.dimension() {
            return Err(RagdexError::input(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.store.dimension()
            )));
        }
        if !is_finite(query) {
            return Err(RagdexError::input("query vector contains non-finite values"));
        }

        let query = normalize(query);
        let k = options.top_k.min(self.store.len());

        let ranked = match &self.strategy {
            SearchStrategy::Accelerated(index) => matched_positions(&index.search(&query, k)?),
            SearchStrategy::BruteForce => brute_force::search(&self.store, &query, k),
        };

        let hits: Vec<Hit> = ranked
            .into_iter()
            .filter_map(|scored| self.hit(scored, options.include_embeddings))
            .collect();

        debug!(
            "{} search returned {} of {} requested hits",
            self.mode(),
            hits.len(),
            options.top_k
        );
        Ok(hits)
    }

    fn hit(&self, scored: ScoredPosition, include_embedding: bool) -> Option<Hit> {
        let record = self.store.record(scored.position)?;
        let embedding = if include_embedding {
            self.store.vector(scored.position).map(<[f32]>::to_vec)
        } else {
            None
        };
        Some(Hit {
            position: scored.position,
            score: scored.score,
            record: record.clone(),
            embedding,
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn mode(&self) -> SearchMode {
        self.strategy.mode()
    }

    /// Index directory, `None` for in-memory engines.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Manifest of the build this engine was opened from.
    pub fn manifest(&self) -> Option<&BuildManifest> {
        self.manifest.as_ref()
    }

    pub fn record(&self, position: usize) -> Option<&ChunkRecord> {
        self.store.record(position)
    }
}

/// Keep the filled slots of a flat index result, dropping padding labels.
fn matched_positions(result: &FlatSearchResult) -> Vec<ScoredPosition> {
    result
        .labels
        .iter()
        .zip(result.scores.iter())
        .filter_map(|(&label, &score)| {
            usize::try_from(label)
                .ok()
                .map(|position| ScoredPosition::new(position, score))
        })
        .collect()
}

fn select_strategy(
    storage: &FileStorage,
    layout: &ArtifactLayout,
    manifest: &BuildManifest,
    store: &RecordStore,
) -> SearchStrategy {
    if !flat::is_available() {
        info!("accelerated search is not compiled in; using brute force");
        return SearchStrategy::BruteForce;
    }
    if !manifest.accelerated {
        info!("index was built without an accelerated artifact; using brute force");
        return SearchStrategy::BruteForce;
    }

    match load_accelerated(storage, layout, manifest, store) {
        Ok(index) => SearchStrategy::Accelerated(index),
        Err(err) => {
            warn!("accelerated index unusable, falling back to brute force: {err}");
            SearchStrategy::BruteForce
        }
    }
}

fn load_accelerated(
    storage: &FileStorage,
    layout: &ArtifactLayout,
    manifest: &BuildManifest,
    store: &RecordStore,
) -> Result<FlatIndex> {
    let bytes = storage.read(&layout.accelerated)?;
    manifest.verify(&layout.accelerated, &bytes)?;
    let index = FlatIndex::from_bytes(&bytes)?;
    if index.len() != store.len() || index.dimension() != store.dimension() {
        return Err(RagdexError::corrupt(format!(
            "flat index holds {} x {} vectors, store holds {} x {}",
            index.len(),
            index.dimension(),
            store.len(),
            store.dimension()
        )));
    }
    Ok(index)
}
