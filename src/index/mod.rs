//! Vector index over document chunks
//!
//! Stores chunk vectors per document and answers nearest-neighbor queries
//! scoped to one document. Two backends ship with the crate:
//! - [`MemoryIndex`] — brute-force scan over an in-process map
//! - [`SqliteIndex`] — durable storage via SQLite
//!
//! Both implement the same [`VectorIndex`] contract, so an approximate
//! nearest-neighbor backend can replace either without touching callers:
//! descending cosine similarity, ties broken by ascending chunk index,
//! at most k results, empty result (not an error) for unknown documents.

mod memory;
mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::error::{Error, Result};
use crate::model::{ChunkVector, ScoredChunk};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for chunk vector storage and similarity search
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add or replace one chunk's vector; idempotent per `chunk_id`
    async fn upsert(&self, chunk: ChunkVector) -> Result<()>;

    /// Return up to `k` chunks of `document_id` ranked by descending
    /// cosine similarity to `query_vector`
    async fn query(
        &self,
        document_id: Uuid,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Remove all chunks of a document, returning how many were removed
    async fn delete_document(&self, document_id: Uuid) -> Result<u64>;

    /// Number of chunks stored for a document
    async fn chunk_count(&self, document_id: Uuid) -> Result<usize>;

    /// The vector dimensionality this index accepts
    fn dimension(&self) -> usize;
}

/// Compute cosine similarity between two vectors
///
/// Identical vectors score 1.0, opposite vectors approach -1.0. Returns 0.0
/// when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Validate a vector's dimensionality against the index's
pub(crate) fn check_dimension(expected: usize, vector: &[f32]) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Rank scored chunks: descending score, ties broken by ascending chunk
/// index, truncated to k
pub(crate) fn rank_top_k(mut chunks: Vec<ScoredChunk>, k: usize) -> Vec<ScoredChunk> {
    chunks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk_index.cmp(&b.chunk_index))
    });
    chunks.truncate(k);
    chunks
}
