use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use ragdex::ingest::{ChunkerConfig, Page, chunk_pages};
use ragdex::service::NO_ANSWER;
use ragdex::{EngineCell, Embedder, IndexBuilder, QueryService, RagdexError, Vector};

/// Embeds by keyword: one dimension per known topic.
#[derive(Debug)]
struct KeywordEmbedder {
    topics: Vec<&'static str>,
    fail_on: Option<&'static str>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self {
            topics: vec!["leave", "remote", "travel"],
            fail_on: None,
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> ragdex::Result<Vector> {
        if self.fail_on.is_some_and(|word| text.contains(word)) {
            return Err(RagdexError::embedding("backend unavailable"));
        }
        let lower = text.to_lowercase();
        let counts: HashMap<&str, usize> = self
            .topics
            .iter()
            .map(|topic| (*topic, lower.matches(topic).count()))
            .collect();
        Ok(Vector::new(
            self.topics.iter().map(|t| counts[t] as f32).collect(),
        ))
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.topics.len())
    }
}

fn policy_pages() -> Vec<Page> {
    vec![
        Page::new(1, "Annual leave is 20 days. Leave requests go to HR."),
        Page::new(2, "Remote work is allowed two days a week."),
        Page::new(3, "Travel expenses are reimbursed within 30 days."),
    ]
}

async fn build_service(dir: &TempDir) -> QueryService {
    let embedder = Arc::new(KeywordEmbedder::new());
    let chunks = chunk_pages(&policy_pages(), &ChunkerConfig::default()).unwrap();
    IndexBuilder::default()
        .build_from_chunks(chunks, embedder.as_ref(), dir.path())
        .await
        .unwrap();
    QueryService::new(Arc::new(EngineCell::new(dir.path())), embedder)
}

#[tokio::test]
async fn test_query_returns_answer_with_sources() {
    let temp_dir = TempDir::new().unwrap();
    let service = build_service(&temp_dir).await;
    assert!(!service.cell().is_open());

    let response = service.query("How much leave do I get?", 1).await.unwrap();
    assert!(service.cell().is_open());
    assert_eq!(response.query, "How much leave do I get?");
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].record.page, 1);
    assert_eq!(
        response.answer,
        "(page 1) Annual leave is 20 days. Leave requests go to HR."
    );
    assert_eq!(response.meta.top_k, 1);
    assert_eq!(response.meta.num_found, 1);
    assert!(response.meta.latency_ms >= 0.0);
}

#[tokio::test]
async fn test_query_joins_sources_with_blank_lines() {
    let temp_dir = TempDir::new().unwrap();
    let service = build_service(&temp_dir).await;

    let response = service.query("remote travel", 2).await.unwrap();
    let pages: Vec<u32> = response.sources.iter().map(|s| s.record.page).collect();
    assert_eq!(pages, vec![2, 3]);
    assert_eq!(response.answer.split("\n\n").count(), 2);
    assert!(response.answer.starts_with("(page 2) Remote work"));
}

#[tokio::test]
async fn test_query_json_shape() {
    let temp_dir = TempDir::new().unwrap();
    let service = build_service(&temp_dir).await;

    let response = service.query("leave", 3).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["sources"][0]["chunk_id"].is_string());
    assert!(json["sources"][0]["text"].is_string());
    assert_eq!(json["meta"]["num_found"], 3);
    assert!(json["meta"]["mode"].is_string());
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let service = build_service(&temp_dir).await;
    assert!(service.query("   ", 3).await.unwrap_err().is_input());
    assert!(!service.cell().is_open());
}

#[tokio::test]
async fn test_embedding_failure_propagates() {
    let temp_dir = TempDir::new().unwrap();
    let chunks = chunk_pages(&policy_pages(), &ChunkerConfig::default()).unwrap();
    let failing = Arc::new(KeywordEmbedder {
        fail_on: Some("Travel"),
        ..KeywordEmbedder::new()
    });

    let err = IndexBuilder::default()
        .build_from_chunks(chunks, failing.as_ref(), temp_dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, RagdexError::Embedding(_)));

    let service = QueryService::new(Arc::new(EngineCell::new(temp_dir.path())), failing);
    let err = service.query("Travel policy?", 3).await.unwrap_err();
    assert!(matches!(err, RagdexError::Embedding(_)));
}

#[tokio::test]
async fn test_query_without_index_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let service = QueryService::new(
        Arc::new(EngineCell::new(temp_dir.path())),
        Arc::new(KeywordEmbedder::new()),
    );
    assert!(service.query("leave", 3).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_health() {
    let temp_dir = TempDir::new().unwrap();
    let empty = QueryService::new(
        Arc::new(EngineCell::new(temp_dir.path())),
        Arc::new(KeywordEmbedder::new()),
    );
    let health = empty.health();
    assert!(!health.ok);
    assert_eq!(health.index_size, 0);
    assert!(health.error.is_some());

    let service = build_service(&temp_dir).await;
    let health = service.health();
    assert!(health.ok);
    assert_eq!(health.index_size, 3);
    assert!(health.error.is_none());
    assert!(!service.cell().is_open());
}

#[test]
fn test_no_answer_text() {
    assert_eq!(NO_ANSWER, "No relevant policy text found.");
}
