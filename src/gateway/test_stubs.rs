//! Deterministic gateway stand-ins for unit tests

use super::{ChatTurn, CompletionModel, Embedder};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Embedder that buckets words into a small fixed-dimension vector
///
/// Texts sharing words get higher cosine similarity, which is enough to
/// exercise ranking without a real model.
pub struct KeywordEmbedder {
    dimension: usize,
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self { dimension: 4 }
    }
}

impl KeywordEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.to_lowercase().split_whitespace() {
            let bucket = word
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            vector[bucket % self.dimension] += 1.0;
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
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "keyword-stub"
    }
}

/// Embedder that succeeds for the first N calls and fails afterwards
pub struct FailingEmbedder {
    calls: AtomicUsize,
    succeed_first: usize,
    dimension: usize,
}

impl FailingEmbedder {
    pub fn fail_after(succeed_first: usize, dimension: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            succeed_first,
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.succeed_first {
            return Err(Error::EmbeddingService("stub failure".to_string()));
        }
        Ok(texts.iter().map(|_| vec![1.0; self.dimension]).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "failing-stub"
    }
}

/// Completion model that counts calls and echoes a canned answer
pub struct CountingCompletion {
    calls: AtomicUsize,
    answer: String,
}

impl CountingCompletion {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: answer.into(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for CountingCompletion {
    async fn complete(&self, _turns: &[ChatTurn]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "counting-stub"
    }
}

/// Completion model that always fails
pub struct FailingCompletion;

#[async_trait]
impl CompletionModel for FailingCompletion {
    async fn complete(&self, _turns: &[ChatTurn]) -> Result<String> {
        Err(Error::CompletionService("stub failure".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-completion-stub"
    }
}
