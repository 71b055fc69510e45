//! Vector similarity index: build, persist, and search.
//!
//! # Module Structure
//!
//! - `builder`: Normalizes records and publishes index artifacts
//! - `core`: Vectors, normalization and chunk records
//! - `engine`: Search engine, strategy selection and the lazy engine cell
//! - `index`: Accelerated flat index
//! - `search`: Ranking and brute-force search
//! - `store`: Record store, artifact codecs, manifest and configuration

pub mod builder;
pub mod core;
pub mod engine;
pub mod index;
pub mod search;
pub mod store;

// Re-exports
pub use builder::{BuildResult, IndexBuilder};
pub use core::record::ChunkRecord;
pub use core::vector::{NORM_EPSILON, Vector, normalize};
pub use engine::cell::EngineCell;
pub use engine::request::SearchOptions;
pub use engine::{Hit, SearchEngine, SearchMode};
pub use index::flat::FlatIndex;
pub use store::RecordStore;
pub use store::config::{ArtifactLayout, IndexConfig};
pub use store::manifest::BuildManifest;
