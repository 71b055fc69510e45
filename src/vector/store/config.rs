//! Index configuration types.
//!
//! ```
//! use ragdex::vector::store::config::IndexConfig;
//!
//! # fn example() -> ragdex::Result<()> {
//! let config = IndexConfig::builder()
//!     .accelerate(false)
//!     .embedding_batch(64)
//!     .build()?;
//! assert!(!config.accelerate);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RagdexError, Result};

fn default_vectors_file() -> String {
    "embeddings.npy".to_string()
}

fn default_metadata_file() -> String {
    "meta.json".to_string()
}

fn default_accelerated_file() -> String {
    "index.flat".to_string()
}

fn default_manifest_file() -> String {
    "manifest.json".to_string()
}

fn default_accelerate() -> bool {
    true
}

fn default_embedding_batch() -> usize {
    32
}

/// File names of the artifacts inside an index directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLayout {
    /// Normalized vectors, `.npy` `(n, d)` float32.
    #[serde(default = "default_vectors_file")]
    pub vectors: String,
    /// Chunk metadata, JSON array in row order.
    #[serde(default = "default_metadata_file")]
    pub metadata: String,
    /// Optional accelerated flat index.
    #[serde(default = "default_accelerated_file")]
    pub accelerated: String,
    /// Build manifest, written last.
    #[serde(default = "default_manifest_file")]
    pub manifest: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            vectors: default_vectors_file(),
            metadata: default_metadata_file(),
            accelerated: default_accelerated_file(),
            manifest: default_manifest_file(),
        }
    }
}

impl ArtifactLayout {
    /// Validate the layout: names must be non-empty, distinct and plain file names.
    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.vectors,
            &self.metadata,
            &self.accelerated,
            &self.manifest,
        ];
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(RagdexError::input(format!(
                    "invalid artifact file name '{name}'"
                )));
            }
            if names[..i].contains(name) {
                return Err(RagdexError::input(format!(
                    "artifact file name '{name}' is used twice"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration shared by the index builder and the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub layout: ArtifactLayout,
    /// Build the accelerated index when the capability is available.
    #[serde(default = "default_accelerate")]
    pub accelerate: bool,
    /// Number of texts sent to the embedder per call.
    #[serde(default = "default_embedding_batch")]
    pub embedding_batch: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            layout: ArtifactLayout::default(),
            accelerate: default_accelerate(),
            embedding_batch: default_embedding_batch(),
        }
    }
}

impl IndexConfig {
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_batch == 0 {
            return Err(RagdexError::input("embedding_batch must be at least 1"));
        }
        self.layout.validate()
    }
}

/// Builder for [`IndexConfig`].
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    layout: Option<ArtifactLayout>,
    accelerate: Option<bool>,
    embedding_batch: Option<usize>,
}

impl IndexConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the artifact file names.
    pub fn layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Enable or disable building the accelerated index.
    pub fn accelerate(mut self, accelerate: bool) -> Self {
        self.accelerate = Some(accelerate);
        self
    }

    pub fn embedding_batch(mut self, batch: usize) -> Self {
        self.embedding_batch = Some(batch);
        self
    }

    pub fn build(self) -> Result<IndexConfig> {
        let config = IndexConfig {
            layout: self.layout.unwrap_or_default(),
            accelerate: self.accelerate.unwrap_or_else(default_accelerate),
            embedding_batch: self.embedding_batch.unwrap_or_else(default_embedding_batch),
        };
        config.validate()?;
        Ok(config)
    }
}
