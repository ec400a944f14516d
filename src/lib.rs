//! docchat: retrieval pipeline core for document question answering
//!
//! Takes an uploaded document (PDF or plain text), splits it into
//! overlapping segments, embeds each segment, and answers questions by
//! retrieving the most similar segments and grounding a completion model
//! in them.
//!
//! The crate is the retrieval core only: HTTP routing, authentication,
//! file storage, and chat-history persistence belong to the calling
//! application. Remote models sit behind the [`gateway`] traits so tests
//! run against deterministic stand-ins.
//!
//! ```no_run
//! use docchat::{Config, DocChat, SqliteIndex};
//! use std::sync::Arc;
//!
//! # async fn run() -> docchat::Result<()> {
//! let config = Config::default();
//! let index = Arc::new(SqliteIndex::connect("chunks.db".as_ref(), config.embedding.dimension).await?);
//! let engine = DocChat::open(&config, index)?;
//!
//! let mut document = docchat::Document::new("paper.pdf");
//! let chunks = engine.ingest_document(&mut document, &std::fs::read("paper.pdf")?, "paper.pdf").await?;
//! println!("indexed {} chunks", chunks);
//!
//! let response = engine.ask(document.id, "What is the main finding?").await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod index;
pub mod ingest;
pub mod model;
pub mod retrieve;
pub mod segment;

pub use answer::{AnswerComposer, NO_CONTEXT_FALLBACK};
pub use config::{ChunkConfig, CompletionConfig, Config, EmbeddingConfig, QueryConfig};
pub use engine::{ChatResponse, DocChat};
pub use error::{Error, Result};
pub use gateway::{ChatTurn, CompletionModel, Embedder, OpenAiCompletion, OpenAiEmbedder, TurnRole};
pub use index::{cosine_similarity, MemoryIndex, SqliteIndex, VectorIndex};
pub use ingest::IngestPipeline;
pub use model::{ChunkVector, Document, DocumentStatus, Message, Role, ScoredChunk};
pub use retrieve::Retriever;
pub use segment::{segment, Segment};
