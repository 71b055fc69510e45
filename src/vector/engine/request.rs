//! Search request options.

use serde::{Deserialize, Serialize};

fn default_top_k() -> usize {
    5
}

/// Options for [`SearchEngine::search_with`](crate::vector::engine::SearchEngine::search_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of hits to return. Must be at least 1.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Attach the stored (normalized) embedding to every hit.
    #[serde(default)]
    pub include_embeddings: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            include_embeddings: false,
        }
    }
}

impl SearchOptions {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            ..Default::default()
        }
    }

    pub fn with_embeddings(mut self, include: bool) -> Self {
        self.include_embeddings = include;
        self
    }
}
