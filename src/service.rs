//! Query service: question text in, answer with sources out.
//!
//! Wraps an [`EngineCell`] and an [`Embedder`]. The engine is opened on the
//! first query, not when the service is created.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::embedding::embedder::Embedder;
use crate::error::{RagdexError, Result};
use crate::storage::FileStorage;
use crate::vector::engine::cell::EngineCell;
use crate::vector::engine::request::SearchOptions;
use crate::vector::engine::{Hit, SearchMode};

/// Characters of chunk text quoted per source in the answer.
pub const SNIPPET_CHARS: usize = 400;

/// Answer text when nothing was retrieved.
pub const NO_ANSWER: &str = "No relevant policy text found.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub top_k: usize,
    pub num_found: usize,
    pub mode: SearchMode,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Hit>,
    pub meta: QueryMeta,
}

/// Index readiness without opening the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub index_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryService {
    cell: Arc<EngineCell>,
    embedder: Arc<dyn Embedder>,
}

impl QueryService {
    pub fn new(cell: Arc<EngineCell>, embedder: Arc<dyn Embedder>) -> Self {
        Self { cell, embedder }
    }

    pub fn cell(&self) -> &Arc<EngineCell> {
        &self.cell
    }

    /// Embed `query`, retrieve the `top_k` closest chunks and quote them.
    pub async fn query(&self, query: &str, top_k: usize) -> Result<QueryResponse> {
        if query.trim().is_empty() {
            return Err(RagdexError::input("query text is empty"));
        }
        let started = Instant::now();

        let vector = self.embedder.embed(query).await?;
        let engine = self.cell.get_or_open()?;
        let sources = engine.search_with(vector.as_slice(), &SearchOptions::new(top_k))?;
        let answer = compose_answer(&sources);

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "answered query with {} sources in {latency_ms:.1} ms",
            sources.len()
        );

        Ok(QueryResponse {
            query: query.to_string(),
            answer,
            meta: QueryMeta {
                top_k,
                num_found: sources.len(),
                mode: engine.mode(),
                latency_ms,
            },
            sources,
        })
    }

    /// Report how many records the metadata artifact holds.
    pub fn health(&self) -> Health {
        health(&self.cell)
    }
}

/// Count the records in the cell's metadata artifact without opening the engine.
pub fn health(cell: &EngineCell) -> Health {
    let storage = FileStorage::new(cell.location());
    let metadata = &cell.config().layout.metadata;
    let counted = storage.read(metadata).and_then(|bytes| {
        serde_json::from_slice::<Vec<IgnoredAny>>(&bytes)
            .map(|entries| entries.len())
            .map_err(|err| RagdexError::corrupt(format!("unreadable metadata: {err}")))
    });

    match counted {
        Ok(index_size) => Health {
            ok: true,
            index_size,
            error: None,
        },
        Err(err) => Health {
            ok: false,
            index_size: 0,
            error: Some(err.to_string()),
        },
    }
}

/// Quote each hit as `(page N) text`, separated by blank lines.
pub fn compose_answer(hits: &[Hit]) -> String {
    if hits.is_empty() {
        return NO_ANSWER.to_string();
    }
    hits.iter()
        .map(|hit| {
            let snippet: String = hit.record.text.chars().take(SNIPPET_CHARS).collect();
            format!("(page {}) {}", hit.record.page, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
