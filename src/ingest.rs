//! Chunk producer: extracted page text in, chunk records out.
//!
//! # Module Structure
//!
//! - [`page`] - Extracted-pages JSON input
//! - [`chunker`] - Text cleaning and overlapping character windows

pub mod chunker;
pub mod page;

pub use chunker::{ChunkerConfig, chunk_pages, chunk_text, clean_text, page_to_chunks};
pub use page::{Page, load_pages, parse_pages};
