//! Remote model gateways
//!
//! Narrow interfaces over the embedding and completion services:
//! - A trait per service so the pipeline is testable with deterministic
//!   stand-ins
//! - An OpenAI-compatible HTTP implementation of each
//!
//! Gateways are constructor-injected into the pipeline and retriever;
//! nothing in this crate holds a global client.

mod openai;
#[cfg(test)]
pub(crate) mod test_stubs;

pub use openai::{OpenAiCompletion, OpenAiEmbedder};

use crate::error::Result;
use crate::model::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_many(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            crate::error::Error::EmbeddingService("empty embedding response".to_string())
        })
    }

    /// Embed a batch of texts, returning vectors in input order
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// One role-tagged turn sent to the completion model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Roles understood by chat completion APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl From<Role> for TurnRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => TurnRole::User,
            Role::Assistant => TurnRole::Assistant,
        }
    }
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }
}

/// Trait for completion providers
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for an ordered list of chat turns
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_serialization() {
        let turn = ChatTurn::system("be concise");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "system");

        let turn = ChatTurn::user("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_role_conversion() {
        assert_eq!(TurnRole::from(Role::User), TurnRole::User);
        assert_eq!(TurnRole::from(Role::Assistant), TurnRole::Assistant);
    }
}
