//! Chunk payloads stored alongside each vector.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::util::id::create_chunk_id;

/// One retrievable unit of source text.
///
/// Serialized field names are the metadata artifact's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Content-addressed id derived from `page`, `start` and `end`.
    pub chunk_id: String,
    /// 1-based source page number.
    pub page: u32,
    /// Inclusive start character offset within the page's cleaned text.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    pub text: String,
}

impl ChunkRecord {
    /// Create a record, deriving its id from the source location.
    pub fn new(page: u32, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            chunk_id: create_chunk_id(page, start, end),
            page,
            start,
            end,
            text: text.into(),
        }
    }

    /// Half-open character span `[start, end)`.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}
