//! # Ragdex
//!
//! Retrieval index for question answering over PDF documents.
//!
//! ## Features
//!
//! - Overlapping character-window chunking with content-addressed chunk ids
//! - Exact cosine-similarity search over normalized `f32` vectors
//! - Parallel SIMD flat index with an equivalent brute-force fallback
//! - Durable, checksummed artifacts published atomically
//! - Pluggable async embedding backends
//!
//! ```no_run
//! use ragdex::{ChunkRecord, IndexBuilder, SearchEngine, Vector};
//!
//! # fn example() -> ragdex::Result<()> {
//! let records = vec![
//!     (ChunkRecord::new(1, 0, 12, "Earned leave"), Vector::new(vec![1.0, 0.0])),
//!     (ChunkRecord::new(1, 10, 24, "Remote work"), Vector::new(vec![0.0, 1.0])),
//! ];
//! IndexBuilder::default().build(records, "./index")?;
//!
//! let engine = SearchEngine::open("./index")?;
//! let hits = engine.search(&[0.9, 0.1], 1)?;
//! assert_eq!(hits[0].record.text, "Earned leave");
//! # Ok(())
//! # }
//! ```

pub mod embedding;
mod error;
pub mod ingest;
pub mod service;
pub mod storage;
mod util;
pub mod vector;

// Re-exports for the public API
pub use embedding::embedder::Embedder;
#[cfg(feature = "embeddings-openai")]
pub use embedding::openai_embedder::{OpenAIEmbedder, OpenAIEmbedderConfig};
pub use error::{RagdexError, Result};
pub use ingest::{ChunkerConfig, Page};
pub use service::{Health, QueryResponse, QueryService};
pub use util::id::create_chunk_id;
pub use vector::{
    BuildResult, ChunkRecord, EngineCell, Hit, IndexBuilder, IndexConfig, SearchEngine,
    SearchMode, SearchOptions, Vector,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
