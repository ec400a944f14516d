//! Question-scoped chunk retrieval
//!
//! Embeds a question and asks the vector index for the top-k most similar
//! chunks of one document. There is no similarity cutoff: if the document
//! has chunks, the top-k by rank always come back.

use crate::config::QueryConfig;
use crate::error::Result;
use crate::gateway::Embedder;
use crate::index::VectorIndex;
use crate::model::ScoredChunk;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Retrieves ranked chunks for a question
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    query_config: QueryConfig,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        query_config: QueryConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            query_config,
        }
    }

    /// Retrieve the top-k chunks of `document_id` most similar to `question`
    ///
    /// `k` is clamped to the configured maximum. A document with no chunks
    /// yields an empty result, not an error.
    pub async fn retrieve(
        &self,
        document_id: Uuid,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let k = k.clamp(1, self.query_config.max_k);

        let query_vector = self.embedder.embed(question).await?;
        let chunks = self.index.query(document_id, &query_vector, k).await?;

        debug!(
            "Retrieved {} chunks for document {} (k={})",
            chunks.len(),
            document_id,
            k
        );

        Ok(chunks)
    }

    /// Retrieve using the configured default k
    pub async fn retrieve_default(
        &self,
        document_id: Uuid,
        question: &str,
    ) -> Result<Vec<ScoredChunk>> {
        self.retrieve(document_id, question, self.query_config.k).await
    }
}
