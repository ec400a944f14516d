//! Default values for configuration

/// Default base URL for the OpenAI-compatible API
pub fn default_api_base_url() -> String {
    std::env::var("DOCCHAT_API_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
}

/// Default environment variable name for the API key
pub fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

/// Default embedding dimension for text-embedding-ada-002
pub fn default_embedding_dimension() -> usize {
    1536
}

/// Default number of chunks embedded concurrently during ingestion
pub fn default_embedding_concurrency() -> usize {
    4
}

/// Default retry attempts for transient gateway failures
pub fn default_gateway_max_retries() -> usize {
    3
}

/// Default gateway request timeout in seconds
pub fn default_gateway_timeout() -> u64 {
    30
}

/// Default completion model
pub fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Default sampling temperature for completions
pub fn default_completion_temperature() -> f32 {
    0.7
}

/// Default target characters per chunk
pub fn default_chunk_size() -> usize {
    1000
}

/// Default overlap characters between chunks
pub fn default_chunk_overlap() -> usize {
    200
}

/// Default number of chunks retrieved per question
pub fn default_query_k() -> usize {
    3
}

/// Default maximum retrievable chunks per question
pub fn default_query_max_k() -> usize {
    20
}
