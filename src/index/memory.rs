//! In-memory vector index
//!
//! Brute-force cosine scan over a per-document chunk list behind a
//! `std::sync::RwLock`. Suitable for tests and moderate single-document
//! scales; the per-document scoping keeps the candidate set bounded.

use super::{check_dimension, cosine_similarity, rank_top_k, VectorIndex};
use crate::error::Result;
use crate::model::{ChunkVector, ScoredChunk};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory [`VectorIndex`] implementation
pub struct MemoryIndex {
    dimension: usize,
    chunks: RwLock<HashMap<Uuid, Vec<ChunkVector>>>,
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, chunk: ChunkVector) -> Result<()> {
        check_dimension(self.dimension, &chunk.vector)?;

        let mut map = self.chunks.write().unwrap();
        let entries = map.entry(chunk.document_id).or_default();
        entries.retain(|c| c.chunk_id != chunk.chunk_id);
        entries.push(chunk);
        Ok(())
    }

    async fn query(
        &self,
        document_id: Uuid,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        check_dimension(self.dimension, query_vector)?;

        let map = self.chunks.read().unwrap();
        let Some(entries) = map.get(&document_id) else {
            return Ok(Vec::new());
        };

        let scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|c| ScoredChunk {
                chunk_id: c.chunk_id,
                chunk_index: c.chunk_index,
                content: c.content.clone(),
                score: cosine_similarity(query_vector, &c.vector),
            })
            .collect();

        Ok(rank_top_k(scored, k))
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64> {
        let mut map = self.chunks.write().unwrap();
        Ok(map.remove(&document_id).map(|v| v.len() as u64).unwrap_or(0))
    }

    async fn chunk_count(&self, document_id: Uuid) -> Result<usize> {
        let map = self.chunks.read().unwrap();
        Ok(map.get(&document_id).map(|v| v.len()).unwrap_or(0))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
