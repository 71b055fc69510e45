//! Text embedding backends.
//!
//! The index only needs one thing from an embedding backend: a dense
//! vector per text, with the same dimension for every call. [`Embedder`]
//! is that contract; [`OpenAIEmbedder`](openai_embedder::OpenAIEmbedder) is
//! the remote implementation behind the `embeddings-openai` feature.

pub mod embedder;
#[cfg(feature = "embeddings-openai")]
pub mod openai_embedder;
