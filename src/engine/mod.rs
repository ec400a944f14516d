//! Engine facade
//!
//! Wires the ingestion pipeline, retriever, and answer composer behind the
//! two operations the application layer calls: ingest an upload, and answer
//! a question. The engine owns the document status transitions and builds
//! the user/assistant message pair the application persists as chat
//! history.

use crate::answer::AnswerComposer;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{CompletionModel, Embedder, OpenAiCompletion, OpenAiEmbedder};
use crate::index::VectorIndex;
use crate::ingest::IngestPipeline;
use crate::model::{Document, DocumentStatus, Message, Role, ScoredChunk};
use crate::retrieve::Retriever;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything the application layer needs after answering one question
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The generated (or fallback) answer text
    pub answer: String,

    /// The chunks the answer was grounded in, ranked by relevance
    pub chunks: Vec<ScoredChunk>,

    /// The user's question as a persistable message
    pub user_message: Message,

    /// The answer as a persistable message, created after the question
    pub assistant_message: Message,
}

/// Document question-answering engine
pub struct DocChat {
    pipeline: IngestPipeline,
    retriever: Retriever,
    composer: AnswerComposer,
    default_k: usize,
}

impl DocChat {
    /// Assemble an engine from explicit collaborators
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionModel>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pipeline: IngestPipeline::new(embedder.clone(), index.clone(), config),
            retriever: Retriever::new(embedder, index, config.query.clone()),
            composer: AnswerComposer::new(completion),
            default_k: config.query.k,
        })
    }

    /// Assemble an engine with the OpenAI-compatible gateways from config
    pub fn open(config: &Config, index: Arc<dyn VectorIndex>) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
        let completion: Arc<dyn CompletionModel> =
            Arc::new(OpenAiCompletion::new(&config.completion)?);
        Self::new(embedder, index, completion, config)
    }

    /// Ingest an uploaded file into the given document
    ///
    /// On success the document transitions to `ready` and the chunk count is
    /// returned. Re-ingesting replaces the document's previous chunk set.
    /// On failure it transitions to `failed` and the index holds either the
    /// previous chunk set or nothing, never a partial one. A caller that
    /// drops the future mid-flight leaves the document `pending`, never
    /// `ready` with partial chunks.
    pub async fn ingest_document(
        &self,
        document: &mut Document,
        raw: &[u8],
        filename: &str,
    ) -> Result<usize> {
        document.status = DocumentStatus::Pending;

        match self.pipeline.ingest(document.id, raw, filename).await {
            Ok(count) => {
                document.status = DocumentStatus::Ready;
                info!("Document {} ready with {} chunks", document.id, count);
                Ok(count)
            }
            Err(e) => {
                document.status = DocumentStatus::Failed;
                warn!("Document {} failed ingestion: {}", document.id, e);
                Err(e)
            }
        }
    }

    /// Answer a question about one document
    ///
    /// Returns the answer, the ranked chunks it was grounded in, and the
    /// user/assistant message pair in creation order.
    pub async fn ask(&self, document_id: Uuid, question: &str) -> Result<ChatResponse> {
        self.ask_with_k(document_id, question, self.default_k).await
    }

    /// Answer a question retrieving up to `k` chunks
    pub async fn ask_with_k(
        &self,
        document_id: Uuid,
        question: &str,
        k: usize,
    ) -> Result<ChatResponse> {
        let chunks = self.retriever.retrieve(document_id, question, k).await?;
        let answer = self.composer.compose(question, &chunks).await?;

        let user_message = Message::new(document_id, Role::User, question);
        let assistant_message = Message::new(document_id, Role::Assistant, answer.clone());

        Ok(ChatResponse {
            answer,
            chunks,
            user_message,
            assistant_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::NO_CONTEXT_FALLBACK;
    use crate::gateway::test_stubs::{CountingCompletion, FailingEmbedder, KeywordEmbedder};
    use crate::index::MemoryIndex;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.chunk.chunk_size = 200;
        config.chunk.overlap = 40;
        config.embedding.dimension = 4;
        config
    }

    fn engine_with(completion: Arc<dyn CompletionModel>) -> DocChat {
        DocChat::new(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(MemoryIndex::new(4)),
            completion,
            &test_config(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_then_ask() {
        let completion = Arc::new(CountingCompletion::new("The answer."));
        let engine = engine_with(completion.clone());

        let mut doc = Document::new("facts.txt");
        let text = "Paris is the capital of France. ".repeat(20);
        let count = engine
            .ingest_document(&mut doc, text.as_bytes(), "facts.txt")
            .await
            .unwrap();

        assert!(count >= 1);
        assert_eq!(doc.status, DocumentStatus::Ready);

        let response = engine.ask(doc.id, "capital of France?").await.unwrap();

        assert_eq!(response.answer, "The answer.");
        assert!(!response.chunks.is_empty());
        assert!(response.chunks.len() <= 3);
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_message_pair_ordering() {
        let engine = engine_with(Arc::new(CountingCompletion::new("ok")));

        let mut doc = Document::new("doc.txt");
        engine
            .ingest_document(&mut doc, b"Some document content for testing.", "doc.txt")
            .await
            .unwrap();

        let response = engine.ask(doc.id, "a question").await.unwrap();

        assert_eq!(response.user_message.role, Role::User);
        assert_eq!(response.user_message.content, "a question");
        assert_eq!(response.assistant_message.role, Role::Assistant);
        assert_eq!(response.assistant_message.content, response.answer);
        assert!(response.user_message.created_at <= response.assistant_message.created_at);
        assert_eq!(response.user_message.document_id, doc.id);
    }

    #[tokio::test]
    async fn test_failed_ingestion_marks_document_failed() {
        let engine = DocChat::new(
            Arc::new(FailingEmbedder::fail_after(0, 4)),
            Arc::new(MemoryIndex::new(4)),
            Arc::new(CountingCompletion::new("unused")),
            &test_config(),
        )
        .unwrap();

        let mut doc = Document::new("doomed.txt");
        let err = engine
            .ingest_document(&mut doc, b"content that will not embed", "doomed.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::Error::EmbeddingService(_)));
        assert_eq!(doc.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_ask_unknown_document_returns_fallback() {
        let completion = Arc::new(CountingCompletion::new("should not appear"));
        let engine = engine_with(completion.clone());

        let response = engine.ask(Uuid::new_v4(), "anything?").await.unwrap();

        assert_eq!(response.answer, NO_CONTEXT_FALLBACK);
        assert!(response.chunks.is_empty());
        assert_eq!(completion.call_count(), 0);
    }
}
