//! Configuration management for docchat
//!
//! Handles loading and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding gateway configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Completion gateway configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,
}

/// Embedding gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the OpenAI-compatible embeddings API
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Concurrent embedding requests during ingestion
    #[serde(default = "default_embedding_concurrency")]
    pub concurrency: usize,

    /// Retry attempts for rate limits and server errors
    #[serde(default = "default_gateway_max_retries")]
    pub max_retries: usize,

    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

/// Completion gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible chat completions API
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model name/identifier
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_completion_temperature")]
    pub temperature: f32,

    /// Retry attempts for rate limits and server errors
    #[serde(default = "default_gateway_max_retries")]
    pub max_retries: usize,

    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Target characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Trailing characters repeated at the start of the next chunk
    #[serde(default = "default_chunk_overlap")]
    pub overlap: usize,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default number of chunks retrieved per question
    #[serde(default = "default_query_k")]
    pub k: usize,

    /// Maximum allowed k
    #[serde(default = "default_query_max_k")]
    pub max_k: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            concurrency: default_embedding_concurrency(),
            max_retries: default_gateway_max_retries(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            model: default_completion_model(),
            temperature: default_completion_temperature(),
            max_retries: default_gateway_max_retries(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_chunk_overlap(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            k: default_query_k(),
            max_k: default_query_max_k(),
        }
    }
}

impl EmbeddingConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        read_api_key(&self.api_key_env)
    }
}

impl CompletionConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        read_api_key(&self.api_key_env)
    }
}

fn read_api_key(var: &str) -> Result<String> {
    std::env::var(var)
        .map_err(|_| Error::Config(format!("{} environment variable not set", var)))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk.chunk_size == 0 {
            return Err(Error::Config(
                "chunk.chunk_size must be positive".to_string(),
            ));
        }

        if self.chunk.overlap >= self.chunk.chunk_size {
            return Err(Error::Config(
                "chunk.overlap must be < chunk.chunk_size".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(Error::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }

        if self.embedding.concurrency == 0 {
            return Err(Error::Config(
                "embedding.concurrency must be positive".to_string(),
            ));
        }

        if self.query.k == 0 || self.query.k > self.query.max_k {
            return Err(Error::Config(format!(
                "query.k must be between 1 and {}",
                self.query.max_k
            )));
        }

        Ok(())
    }
}
