//! Overlapping character-window chunking.
//!
//! Offsets are character offsets into the cleaned page text, not byte
//! offsets, and they describe the untrimmed window; the stored text is that
//! window trimmed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RagdexError, Result};
use crate::ingest::page::Page;
use crate::vector::core::record::ChunkRecord;

static CRLF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn default_max_chars() -> usize {
    1200
}

fn default_overlap() -> usize {
    200
}

/// Window size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkerConfig {
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        let config = Self { max_chars, overlap };
        config.validate()?;
        Ok(config)
    }

    /// A window must advance: `overlap < max_chars`, `max_chars > 0`.
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(RagdexError::input("max_chars must be at least 1"));
        }
        if self.overlap >= self.max_chars {
            return Err(RagdexError::input(format!(
                "overlap {} must be smaller than max_chars {}",
                self.overlap, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Collapse line breaks and whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    let text = CRLF.replace_all(text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Split `text` into `(start, end, trimmed_text)` windows.
///
/// Windows whose trimmed text is empty are skipped. The last window always
/// ends at the end of the text.
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Result<Vec<(usize, usize, String)>> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + config.max_chars).min(len);
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push((start, end, trimmed.to_string()));
        }
        if end == len {
            break;
        }
        start = end.saturating_sub(config.overlap);
    }

    Ok(chunks)
}

/// Clean and chunk one page into records.
pub fn page_to_chunks(page: &Page, config: &ChunkerConfig) -> Result<Vec<ChunkRecord>> {
    let clean = clean_text(&page.text);
    Ok(chunk_text(&clean, config)?
        .into_iter()
        .map(|(start, end, text)| ChunkRecord::new(page.page, start, end, text))
        .collect())
}

/// Chunk every page, keeping page order.
pub fn chunk_pages(pages: &[Page], config: &ChunkerConfig) -> Result<Vec<ChunkRecord>> {
    let mut records = Vec::new();
    for page in pages {
        records.extend(page_to_chunks(page, config)?);
    }
    Ok(records)
}
