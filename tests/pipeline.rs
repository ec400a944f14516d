//! End-to-end pipeline tests with deterministic gateway stand-ins

use async_trait::async_trait;
use docchat::{
    ChatTurn, CompletionModel, Config, DocChat, Document, DocumentStatus, Embedder, Error,
    MemoryIndex, Result, Role, SqliteIndex, VectorIndex, NO_CONTEXT_FALLBACK,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

const DIMENSION: usize = 16;

/// Buckets words into a fixed-dimension vector so texts sharing keywords
/// get higher cosine similarity
struct KeywordEmbedder;

impl KeywordEmbedder {
    fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSION];
        for word in text.to_lowercase().split_whitespace() {
            let bucket = word
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            vector[bucket % DIMENSION] += 1.0;
        }
        if vector.iter().all(|v| *v == 0.0) {
            vector[0] = 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "keyword-stub"
    }
}

/// Embedder that fails after a fixed number of successful calls
struct FlakyEmbedder {
    calls: AtomicUsize,
    succeed_first: usize,
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.succeed_first {
            return Err(Error::EmbeddingService("stub outage".to_string()));
        }
        Ok(texts.iter().map(|t| KeywordEmbedder::vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "flaky-stub"
    }
}

struct CountingCompletion {
    calls: AtomicUsize,
}

impl CountingCompletion {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for CountingCompletion {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Echo a marker proving the context block reached the model
        let context_seen = turns.iter().any(|t| t.content.contains("[Excerpt 1]"));
        Ok(format!("grounded answer (context: {})", context_seen))
    }

    fn model_name(&self) -> &str {
        "counting-stub"
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.embedding.dimension = DIMENSION;
    config
}

/// Three ~800-character paragraphs with distinct vocabulary
fn three_paragraph_document() -> String {
    let weather = "Cold fronts bring sudden drops in temperature across the plains. ".repeat(13);
    let volcano = "Volcanic eruptions happen when magma rises through the crust. ".repeat(13);
    let ocean = "Deep ocean currents carry nutrients across entire hemispheres. ".repeat(12);
    format!(
        "{}\n\n{}\n\n{}",
        weather.trim_end(),
        volcano.trim_end(),
        ocean.trim_end()
    )
}

fn engine_with_memory_index(
    completion: Arc<CountingCompletion>,
) -> (DocChat, Arc<MemoryIndex>) {
    let index = Arc::new(MemoryIndex::new(DIMENSION));
    let engine = DocChat::new(
        Arc::new(KeywordEmbedder),
        index.clone(),
        completion,
        &test_config(),
    )
    .unwrap();
    (engine, index)
}

#[tokio::test]
async fn three_paragraph_txt_yields_three_ranked_chunks() {
    let completion = Arc::new(CountingCompletion::new());
    let (engine, index) = engine_with_memory_index(completion.clone());

    let text = three_paragraph_document();
    assert!(text.len() > 2000 && text.len() < 3000);

    let mut document = Document::new("science.txt");
    let count = engine
        .ingest_document(&mut document, text.as_bytes(), "science.txt")
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(document.status, DocumentStatus::Ready);
    assert_eq!(index.chunk_count(document.id).await.unwrap(), 3);

    // The answer to this question lives in paragraph 2
    let response = engine
        .ask(document.id, "when do volcanic eruptions happen as magma rises")
        .await
        .unwrap();

    assert!(!response.chunks.is_empty());
    assert!(response.chunks[0].content.contains("magma"));
    assert_eq!(response.chunks[0].chunk_index, 1);
    assert_eq!(response.answer, "grounded answer (context: true)");
    assert_eq!(completion.call_count(), 1);

    // Scores come back in descending order
    for pair in response.chunks.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn unsupported_extension_fails_before_any_work() {
    let completion = Arc::new(CountingCompletion::new());
    let (engine, index) = engine_with_memory_index(completion);

    let mut document = Document::new("slides.docx");
    let err = engine
        .ingest_document(&mut document, b"irrelevant bytes", "slides.docx")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedFileType(ext) if ext == ".docx"));
    assert_eq!(document.status, DocumentStatus::Failed);
    assert_eq!(index.chunk_count(document.id).await.unwrap(), 0);
}

#[tokio::test]
async fn embedding_outage_mid_ingest_leaves_nothing_behind() {
    let completion = Arc::new(CountingCompletion::new());
    let index = Arc::new(MemoryIndex::new(DIMENSION));
    let engine = DocChat::new(
        Arc::new(FlakyEmbedder {
            calls: AtomicUsize::new(0),
            succeed_first: 1,
        }),
        index.clone(),
        completion,
        &test_config(),
    )
    .unwrap();

    let mut document = Document::new("science.txt");
    let text = three_paragraph_document();
    let err = engine
        .ingest_document(&mut document, text.as_bytes(), "science.txt")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmbeddingService(_)));
    assert_eq!(document.status, DocumentStatus::Failed);
    assert_eq!(index.chunk_count(document.id).await.unwrap(), 0);
}

#[tokio::test]
async fn question_against_empty_document_gets_fallback() {
    let completion = Arc::new(CountingCompletion::new());
    let (engine, _) = engine_with_memory_index(completion.clone());

    let response = engine
        .ask(Uuid::new_v4(), "is anything in here?")
        .await
        .unwrap();

    assert_eq!(response.answer, NO_CONTEXT_FALLBACK);
    assert!(response.chunks.is_empty());
    assert_eq!(completion.call_count(), 0);

    // The message pair still records the exchange in creation order
    assert_eq!(response.user_message.role, Role::User);
    assert_eq!(response.assistant_message.role, Role::Assistant);
    assert!(response.user_message.created_at <= response.assistant_message.created_at);
}

#[tokio::test]
async fn sqlite_index_survives_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let db_path = tmp.path().join("chunks.db");
    let completion = Arc::new(CountingCompletion::new());

    let mut document = Document::new("science.txt");
    let text = three_paragraph_document();

    {
        let index = Arc::new(SqliteIndex::connect(&db_path, DIMENSION).await.unwrap());
        let engine = DocChat::new(
            Arc::new(KeywordEmbedder),
            index,
            completion.clone(),
            &test_config(),
        )
        .unwrap();

        engine
            .ingest_document(&mut document, text.as_bytes(), "science.txt")
            .await
            .unwrap();
    }

    // A fresh engine over the same database still answers from the chunks
    let index = Arc::new(SqliteIndex::connect(&db_path, DIMENSION).await.unwrap());
    let engine = DocChat::new(
        Arc::new(KeywordEmbedder),
        index,
        completion,
        &test_config(),
    )
    .unwrap();

    let response = engine
        .ask(document.id, "what do deep ocean currents carry?")
        .await
        .unwrap();

    assert!(!response.chunks.is_empty());
    assert!(response.chunks[0].content.contains("ocean currents"));
}
