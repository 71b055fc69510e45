//! Lazily opened, shared search engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::error::Result;
use crate::vector::engine::SearchEngine;
use crate::vector::store::config::IndexConfig;

/// Caller-owned handle that opens a [`SearchEngine`] on first use.
///
/// The first successful [`get_or_open`](EngineCell::get_or_open) loads the
/// index; every later call returns the same `Arc`. Concurrent first calls
/// serialize on one lock, so the index is loaded at most once. A failed open
/// leaves the cell empty and the next call tries again.
#[derive(Debug)]
pub struct EngineCell {
    location: PathBuf,
    config: IndexConfig,
    engine: Mutex<Option<Arc<SearchEngine>>>,
}

impl EngineCell {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self::with_config(location, IndexConfig::default())
    }

    pub fn with_config(location: impl Into<PathBuf>, config: IndexConfig) -> Self {
        Self {
            location: location.into(),
            config,
            engine: Mutex::new(None),
        }
    }

    /// Return the engine, opening it if this is the first use.
    pub fn get_or_open(&self) -> Result<Arc<SearchEngine>> {
        let mut slot = self.engine.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        debug!("opening search engine at {}", self.location.display());
        let engine = Arc::new(SearchEngine::open_with_config(
            &self.location,
            self.config.clone(),
        )?);
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    /// The engine if it has already been opened.
    pub fn get(&self) -> Option<Arc<SearchEngine>> {
        self.engine.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.engine.lock().is_some()
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}
