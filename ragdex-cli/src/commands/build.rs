use std::path::Path;

use anyhow::{Result, bail};
use ragdex::{IndexBuilder, IndexConfig, Vector};

use crate::cli::BuildCommand;
use crate::context;
use crate::output::{self, OutputFormat};

/// Execute a build command.
pub async fn run(cmd: BuildCommand, index_dir: &Path, format: OutputFormat) -> Result<()> {
    let config = IndexConfig::builder()
        .accelerate(!cmd.no_accelerate)
        .embedding_batch(cmd.embedding_batch)
        .build()?;
    let builder = IndexBuilder::new(config)?;
    let chunks = context::load_chunks(&cmd.chunks)?;

    let result = match &cmd.embeddings {
        Some(path) => {
            let embeddings = context::load_embeddings(path)?;
            if embeddings.len() != chunks.len() {
                bail!(
                    "{} holds {} vectors for {} chunks",
                    path.display(),
                    embeddings.len(),
                    chunks.len()
                );
            }
            let records = chunks
                .into_iter()
                .zip(embeddings.into_iter().map(Vector::new))
                .collect();
            builder.build(records, index_dir)?
        }
        None => {
            let embedder = context::embedder_from_env()?;
            builder
                .build_from_chunks(chunks, embedder.as_ref(), index_dir)
                .await?
        }
    };

    output::print_build_result(&result, format)
}
