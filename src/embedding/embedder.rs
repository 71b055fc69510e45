//! The embedding contract consumed by the builder and the query service.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::{RagdexError, Result};
use crate::vector::core::vector::Vector;

/// Turns text into dense vectors.
///
/// Implementations report failures as [`RagdexError::Embedding`]. Callers
/// never retry; a failed call fails the build or the query.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Embed a batch of texts, one vector per text in input order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed) sequentially.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Output dimension when known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Check that a backend returned one vector per input.
pub(crate) fn ensure_batch_len(embedder: &dyn Embedder, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(RagdexError::embedding(format!(
            "{} returned {} vectors for {} texts",
            embedder.name(),
            got,
            expected
        )));
    }
    Ok(())
}
