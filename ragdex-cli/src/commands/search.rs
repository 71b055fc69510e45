use std::path::Path;

use anyhow::{Context, Result};
use ragdex::{SearchEngine, SearchOptions};

use crate::cli::SearchCommand;
use crate::output::{self, OutputFormat};

/// Execute a search command.
pub fn run(cmd: SearchCommand, index_dir: &Path, format: OutputFormat) -> Result<()> {
    let query: Vec<f32> =
        serde_json::from_str(&cmd.vector).context("Failed to parse query vector JSON")?;
    let engine = SearchEngine::open(index_dir)
        .with_context(|| format!("Failed to open index at {}", index_dir.display()))?;

    let options = SearchOptions::new(cmd.top_k).with_embeddings(cmd.with_embeddings);
    let hits = engine.search_with(&query, &options)?;
    output::print_hits(&hits, format)
}
