//! Durable vector index backed by SQLite
//!
//! Persists the chunk record shape `{document_id, chunk_index, content,
//! embedding}` with point lookup by document. Embeddings are stored as
//! little-endian f32 BLOBs; similarity is computed in Rust over the
//! document-scoped candidate set, so queries stay exact while the candidate
//! set stays bounded. Every statement is parameterized — no value is ever
//! spliced into SQL text.

use super::{check_dimension, cosine_similarity, rank_top_k, VectorIndex};
use crate::error::{Error, Result};
use crate::model::{ChunkVector, ScoredChunk};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// SQL schema for the chunk store
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT PRIMARY KEY,
    document_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    dims INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(document_id, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
"#;

/// Durable [`VectorIndex`] implementation
#[derive(Clone)]
pub struct SqliteIndex {
    pool: SqlitePool,
    dimension: usize,
}

impl SqliteIndex {
    /// Open (or create) a chunk database at the given path
    pub async fn connect(db_path: &Path, dimension: usize) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to chunk database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let index = Self { pool, dimension };
        index.init_schema().await?;
        Ok(index)
    }

    /// Open an in-memory chunk database (tests, ephemeral sessions)
    pub async fn in_memory(dimension: usize) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let index = Self { pool, dimension };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

/// Encode a float vector as little-endian f32 bytes
fn vec_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for &v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector
fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn upsert(&self, chunk: ChunkVector) -> Result<()> {
        check_dimension(self.dimension, &chunk.vector)?;

        sqlx::query(
            r#"
            INSERT INTO chunks (chunk_id, document_id, chunk_index, content, embedding, dims, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(chunk_id) DO UPDATE SET
                document_id = excluded.document_id,
                chunk_index = excluded.chunk_index,
                content = excluded.content,
                embedding = excluded.embedding,
                dims = excluded.dims,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chunk.chunk_id.to_string())
        .bind(chunk.document_id.to_string())
        .bind(chunk.chunk_index)
        .bind(&chunk.content)
        .bind(vec_to_blob(&chunk.vector))
        .bind(chunk.vector.len() as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(
        &self,
        document_id: Uuid,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        check_dimension(self.dimension, query_vector)?;

        let rows = sqlx::query(
            "SELECT chunk_id, chunk_index, content, embedding FROM chunks WHERE document_id = ?",
        )
        .bind(document_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            let chunk_id: String = row.try_get("chunk_id")?;
            let chunk_index: i64 = row.try_get("chunk_index")?;
            let content: String = row.try_get("content")?;
            let blob: Vec<u8> = row.try_get("embedding")?;

            let vector = blob_to_vec(&blob);
            check_dimension(self.dimension, &vector)?;

            let chunk_id = Uuid::try_parse(&chunk_id)
                .map_err(|e| Error::Other(format!("corrupt chunk id: {}", e)))?;

            scored.push(ScoredChunk {
                chunk_id,
                chunk_index: chunk_index as i32,
                content,
                score: cosine_similarity(query_vector, &vector),
            });
        }

        Ok(rank_top_k(scored, k))
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn chunk_count(&self, document_id: Uuid) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE document_id = ?")
            .bind(document_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("n")?;
        Ok(count as usize)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
