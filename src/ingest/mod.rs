//! Ingestion pipeline
//!
//! Turns raw uploaded bytes into an indexed set of chunk vectors:
//! extract plain text, segment it, embed every segment, and upsert the
//! vectors in sequence order. The pipeline is all-or-nothing at the
//! document level: any failure removes already-indexed chunks so the
//! retriever never sees a partial chunk set.

use crate::config::{ChunkConfig, Config};
use crate::error::{Error, Result};
use crate::extract::extract_text;
use crate::gateway::Embedder;
use crate::index::VectorIndex;
use crate::model::ChunkVector;
use crate::segment::segment;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Orchestrates Segmenter, Embedding Gateway, and Vector Index
pub struct IngestPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunk_config: ChunkConfig,
    concurrency: usize,
}

impl IngestPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: &Config,
    ) -> Self {
        Self {
            embedder,
            index,
            chunk_config: config.chunk.clone(),
            concurrency: config.embedding.concurrency.max(1),
        }
    }

    /// Ingest one document, returning the number of chunks created
    ///
    /// Embedding calls run concurrently up to the configured limit, but
    /// chunk ordering always follows the original text. A prior chunk set
    /// for the document is replaced only after every segment has embedded;
    /// chunks indexed before a failure are deleted before the error is
    /// returned.
    pub async fn ingest(&self, document_id: Uuid, raw: &[u8], filename: &str) -> Result<usize> {
        let text = extract_text(raw, filename)?;
        let segments = segment(&text, &self.chunk_config)?;

        info!(
            "Ingesting {} ({} chars, {} segments)",
            filename,
            text.len(),
            segments.len()
        );

        // Embed every segment before touching the index, so an embedding
        // failure leaves nothing to roll back
        let embeddings: Vec<(usize, Result<Vec<f32>>)> = stream::iter(
            segments
                .iter()
                .map(|seg| {
                    let embedder = self.embedder.clone();
                    let text = seg.text.clone();
                    let index = seg.index;
                    async move { (index, embedder.embed(&text).await) }
                }),
        )
        .buffered(self.concurrency)
        .collect()
        .await;

        let mut vectors = Vec::with_capacity(embeddings.len());
        let mut failed_indices = Vec::new();
        let mut first_error = None;

        for (seg_index, result) in embeddings {
            match result {
                Ok(vector) => vectors.push((seg_index, vector)),
                Err(e) => {
                    warn!("Embedding failed for chunk {}: {}", seg_index, e);
                    failed_indices.push(seg_index);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if !failed_indices.is_empty() {
            return Err(Error::EmbeddingService(format!(
                "could not embed chunk(s) {:?}: {}",
                failed_indices,
                first_error.expect("at least one failure recorded")
            )));
        }

        // Replace any chunk set from a previous ingest of this document.
        // Deferred until after embedding succeeds so an embedding failure
        // leaves the existing chunks untouched.
        self.index.delete_document(document_id).await?;

        // Upsert in original order; roll back on any failure
        for (seg, (_, vector)) in segments.iter().zip(vectors) {
            let chunk = ChunkVector {
                chunk_id: Uuid::new_v4(),
                document_id,
                chunk_index: seg.index as i32,
                content: seg.text.clone(),
                vector,
            };

            if let Err(e) = self.index.upsert(chunk).await {
                warn!(
                    "Indexing failed at chunk {} of document {}; rolling back",
                    seg.index, document_id
                );
                self.rollback(document_id).await;
                return Err(e);
            }
        }

        debug!(
            "Indexed {} chunks for document {}",
            segments.len(),
            document_id
        );

        Ok(segments.len())
    }

    async fn rollback(&self, document_id: Uuid) {
        if let Err(e) = self.index.delete_document(document_id).await {
            warn!(
                "Rollback failed for document {}: {} (stale chunks may remain)",
                document_id, e
            );
        }
    }
}
