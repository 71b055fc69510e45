use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Ragdex - retrieval index for PDF question answering
#[derive(Parser)]
#[command(name = "ragdex", version, about)]
pub struct Cli {
    /// Path to the index directory.
    #[arg(long, env = "RAGDEX_INDEX_DIR", default_value = "./index")]
    pub index_dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split extracted pages into overlapping chunks.
    Chunk(ChunkCommand),
    /// Embed chunks and build the index.
    Build(BuildCommand),
    /// Search the index with a raw query vector.
    Search(SearchCommand),
    /// Answer a question from the index.
    Query(QueryCommand),
    /// Report whether the index is readable.
    Health,
}

#[derive(Parser)]
pub struct ChunkCommand {
    /// Extracted pages JSON (a list, or an object with a "pages" list).
    #[arg(long)]
    pub pages: PathBuf,

    /// Output chunks JSON.
    #[arg(long)]
    pub out: PathBuf,

    /// Maximum characters per chunk.
    #[arg(long, default_value_t = 1200)]
    pub max_chars: usize,

    /// Characters shared by consecutive chunks.
    #[arg(long, default_value_t = 200)]
    pub overlap: usize,
}

#[derive(Parser)]
pub struct BuildCommand {
    /// Chunks JSON written by `chunk`.
    #[arg(long)]
    pub chunks: PathBuf,

    /// Precomputed embeddings (JSON list of vectors, one per chunk).
    /// When omitted, chunks are embedded with the configured backend.
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// Texts sent to the embedding backend per request.
    #[arg(long, default_value_t = 32)]
    pub embedding_batch: usize,

    /// Skip the accelerated index; queries use brute force.
    #[arg(long)]
    pub no_accelerate: bool,
}

#[derive(Parser)]
pub struct SearchCommand {
    /// Query vector as a JSON array.
    #[arg(long)]
    pub vector: String,

    /// Maximum number of hits.
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Include stored embeddings in the output.
    #[arg(long)]
    pub with_embeddings: bool,
}

#[derive(Parser)]
pub struct QueryCommand {
    /// Question text.
    #[arg(long)]
    pub q: String,

    /// Maximum number of sources.
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,
}
