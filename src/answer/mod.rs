//! Grounded answer composition
//!
//! Assembles a prompt from retrieved chunks and the user's question and
//! delegates to the completion gateway. With no retrieved context the
//! composer returns a fixed fallback without spending a completion call.

use crate::error::Result;
use crate::gateway::{ChatTurn, CompletionModel};
use crate::model::ScoredChunk;
use std::sync::Arc;
use tracing::debug;

/// System instruction sent with every grounded prompt
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
based on document content. Answer only from the provided context, be concise \
and accurate, and say so when the context does not contain the answer.";

/// Returned when retrieval produced no chunks; no completion call is made
pub const NO_CONTEXT_FALLBACK: &str = "I could not find relevant information in \
the document to answer this question.";

/// Builds prompts and produces the final answer text
pub struct AnswerComposer {
    completion: Arc<dyn CompletionModel>,
}

impl AnswerComposer {
    pub fn new(completion: Arc<dyn CompletionModel>) -> Self {
        Self { completion }
    }

    /// Compose an answer to `question` grounded in `ranked_chunks`
    ///
    /// Completion failures propagate to the caller; a partial answer is
    /// never returned.
    pub async fn compose(&self, question: &str, ranked_chunks: &[ScoredChunk]) -> Result<String> {
        if ranked_chunks.is_empty() {
            debug!("No context retrieved; returning fallback without completion call");
            return Ok(NO_CONTEXT_FALLBACK.to_string());
        }

        let turns = build_prompt(question, ranked_chunks);
        self.completion.complete(&turns).await
    }
}

/// Build the two-part grounded prompt: system instruction plus one user
/// turn carrying the excerpt-labeled context block and the question
fn build_prompt(question: &str, ranked_chunks: &[ScoredChunk]) -> Vec<ChatTurn> {
    let context = ranked_chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Excerpt {}]\n{}", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let user = format!(
        "Based on the following context from the document:\n\n{}\n\n\
         Answer this question: {}\n\n\
         If the answer cannot be derived from the context, say so.",
        context, question
    );

    vec![ChatTurn::system(SYSTEM_PROMPT), ChatTurn::user(user)]
}
