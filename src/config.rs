//! Engine configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//!
//! Building a configuration never fails. A missing API key only becomes an
//! error when an operation actually needs the model provider, so offline
//! paths (empty moderation windows, FAQ fallbacks, stored-vector lookups)
//! work without credentials.

/// Default chat completion model.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default embedding model.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-ada-002";
/// Default number of candidates fetched before semantic reranking.
const DEFAULT_CANDIDATE_POOL: usize = 100;
/// Default number of reranked listings kept for answer grounding.
const DEFAULT_TOP_K: usize = 8;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the model provider. `None` until a model-backed
    /// operation requires it.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for chat completions (answers, moderation, FAQ synthesis).
    pub chat_model: String,
    /// Model for text embeddings.
    pub embed_model: String,
    /// Number of candidates fetched before semantic reranking.
    pub candidate_pool: usize,
    /// Number of reranked listings kept for answer grounding.
    pub top_k: usize,
}

impl AiConfig {
    /// Creates a new builder for `AiConfig`.
    #[must_use]
    pub fn builder() -> AiConfigBuilder {
        AiConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`AiConfig`].
#[derive(Debug, Clone, Default)]
pub struct AiConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    chat_model: Option<String>,
    embed_model: Option<String>,
    candidate_pool: Option<usize>,
    top_k: Option<usize>,
}

impl AiConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("RUMMAGE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("RUMMAGE_BASE_URL"))
                .ok();
        }
        if self.chat_model.is_none() {
            self.chat_model = std::env::var("RUMMAGE_CHAT_MODEL").ok();
        }
        if self.embed_model.is_none() {
            self.embed_model = std::env::var("RUMMAGE_EMBED_MODEL").ok();
        }
        if self.candidate_pool.is_none() {
            self.candidate_pool = std::env::var("RUMMAGE_CANDIDATE_POOL")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("RUMMAGE_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat completion model.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = Some(model.into());
        self
    }

    /// Sets the candidate pool size.
    #[must_use]
    pub const fn candidate_pool(mut self, n: usize) -> Self {
        self.candidate_pool = Some(n);
        self
    }

    /// Sets the rerank top-k.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Builds the [`AiConfig`].
    #[must_use]
    pub fn build(self) -> AiConfig {
        AiConfig {
            api_key: self.api_key,
            base_url: self.base_url,
            chat_model: self
                .chat_model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embed_model: self
                .embed_model
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            candidate_pool: self.candidate_pool.unwrap_or(DEFAULT_CANDIDATE_POOL),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
        }
    }
}
