use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ragdex::{ChunkRecord, Embedder, EngineCell, QueryService};

/// Read a chunks JSON file written by `chunk`.
pub fn load_chunks(path: &Path) -> Result<Vec<ChunkRecord>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read chunks file {}", path.display()))?;
    serde_json::from_slice(&bytes).context("Failed to parse chunks JSON")
}

/// Read precomputed embeddings: a JSON list of vectors.
pub fn load_embeddings(path: &Path) -> Result<Vec<Vec<f32>>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read embeddings file {}", path.display()))?;
    serde_json::from_slice(&bytes).context("Failed to parse embeddings JSON")
}

/// Build the query service for an index directory.
pub fn query_service(index_dir: &Path) -> Result<QueryService> {
    let cell = Arc::new(EngineCell::new(index_dir));
    Ok(QueryService::new(cell, embedder_from_env()?))
}

/// The embedding backend configured through the environment.
#[cfg(feature = "embeddings-openai")]
pub fn embedder_from_env() -> Result<Arc<dyn Embedder>> {
    match ragdex::OpenAIEmbedder::from_env()? {
        Some(embedder) => Ok(Arc::new(embedder)),
        None => anyhow::bail!("No embedding backend configured. Set OPENAI_API_KEY."),
    }
}

#[cfg(not(feature = "embeddings-openai"))]
pub fn embedder_from_env() -> Result<Arc<dyn Embedder>> {
    anyhow::bail!(
        "ragdex was built without an embedding backend. \
         Rebuild with --features embeddings-openai, or pass --embeddings to build."
    )
}
