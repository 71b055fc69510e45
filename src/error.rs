//! Error types for the retrieval index.
//!
//! Every failure in the build and search paths surfaces as a [`RagdexError`].
//! The only deliberate soft fallback (brute force when the accelerated index
//! is unavailable) is not an error and never appears here.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RagdexError>;

/// Errors produced by the index builder, the search engine and their
/// collaborators.
#[derive(Error, Debug)]
pub enum RagdexError {
    /// Malformed or inconsistent input (dimension mismatch, empty batch, ...).
    #[error("input error: {0}")]
    Input(String),

    /// A mandatory index artifact is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Artifacts exist but are structurally inconsistent or undecodable.
    #[error("corrupt store: {0}")]
    CorruptStore(String),

    /// Artifact read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure reported by the embedding backend.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// JSON (de)serialization failure outside artifact decoding.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RagdexError {
    /// Create an input error.
    pub fn input<S: Into<String>>(msg: S) -> Self {
        RagdexError::Input(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        RagdexError::NotFound(msg.into())
    }

    /// Create a corrupt-store error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        RagdexError::CorruptStore(msg.into())
    }

    /// Create an embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        RagdexError::Embedding(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RagdexError::NotFound(_))
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, RagdexError::CorruptStore(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(self, RagdexError::Input(_))
    }
}
