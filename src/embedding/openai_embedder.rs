//! OpenAI-compatible remote embedder.

use std::env;
use std::fmt;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::embedder::Embedder;
use crate::error::{RagdexError, Result};
use crate::vector::core::vector::Vector;

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_input_chars() -> usize {
    8192
}

/// Connection settings for [`OpenAIEmbedder`].
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAIEmbedderConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inputs are cut to this many characters before sending.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl fmt::Debug for OpenAIEmbedderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIEmbedderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl OpenAIEmbedderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            max_input_chars: default_max_input_chars(),
        }
    }

    /// Read `OPENAI_API_KEY`, `EMBEDDING_MODEL` and `OPENAI_BASE_URL`.
    ///
    /// Returns `None` when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("EMBEDDING_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        Some(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: Client,
    endpoint: String,
    config: OpenAIEmbedderConfig,
}

impl fmt::Debug for OpenAIEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAIEmbedder {
    pub fn new(config: OpenAIEmbedderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RagdexError::embedding("missing OpenAI API key"));
        }
        if config.model.trim().is_empty() {
            return Err(RagdexError::embedding("missing embedding model name"));
        }
        let client = Client::builder()
            .build()
            .map_err(|err| RagdexError::embedding(format!("failed to build HTTP client: {err}")))?;
        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Create an embedder from the environment, if an API key is set.
    pub fn from_env() -> Result<Option<Self>> {
        OpenAIEmbedderConfig::from_env().map(Self::new).transpose()
    }

    pub fn config(&self) -> &OpenAIEmbedderConfig {
        &self.config
    }

    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_input_chars) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        }
    }

    async fn request(&self, inputs: Vec<&str>) -> Result<Vec<Vector>> {
        let expected = inputs.len();
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.config.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|err| RagdexError::embedding(format!("embedding request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RagdexError::embedding(format!(
                "embedding request failed ({status}): {detail}"
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|err| {
            RagdexError::embedding(format!("failed to parse embedding response: {err}"))
        })?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != expected {
            return Err(RagdexError::embedding(format!(
                "embedding service returned {} vectors for {} inputs",
                parsed.data.len(),
                expected
            )));
        }

        debug!("embedded {expected} texts with {}", self.config.model);
        Ok(parsed
            .data
            .into_iter()
            .map(|entry| Vector::new(entry.embedding))
            .collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.request(vec![self.truncate(text)])
            .await?
            .pop()
            .ok_or_else(|| RagdexError::embedding("embedding service returned no vectors"))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs = texts.iter().map(|text| self.truncate(text)).collect();
        self.request(inputs).await
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
