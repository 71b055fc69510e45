use std::fs;

use anyhow::{Context, Result};
use ragdex::ingest::{self, ChunkerConfig};

use crate::cli::ChunkCommand;

/// Execute a chunk command.
pub fn run(cmd: ChunkCommand) -> Result<()> {
    let config = ChunkerConfig::new(cmd.max_chars, cmd.overlap)?;
    let pages = ingest::load_pages(&cmd.pages)
        .with_context(|| format!("Failed to load pages from {}", cmd.pages.display()))?;
    let chunks = ingest::chunk_pages(&pages, &config)?;

    if let Some(parent) = cmd.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    let json = serde_json::to_string_pretty(&chunks)?;
    fs::write(&cmd.out, json).context("Failed to write chunks file")?;

    println!(
        "Wrote {} chunks from {} pages to {}.",
        chunks.len(),
        pages.len(),
        cmd.out.display()
    );
    Ok(())
}
