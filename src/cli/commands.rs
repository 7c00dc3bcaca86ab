//! CLI command implementations.
//!
//! Loads the JSON corpus into a [`MemoryStore`], builds the engine
//! components, runs one operation, and renders the result through
//! [`crate::cli::output`].

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::BatchAnalyzer;
use crate::assist::Assistant;
use crate::cli::output::{self, OutputFormat};
use crate::cli::parser::{Cli, Commands};
use crate::config::AiConfig;
use crate::core::Listing;
use crate::provider::ModelProvider;
use crate::providers::OpenAiProvider;
use crate::search::RetrievalPipeline;
use crate::store::{ListingStore, MemoryStore};

/// Executes the parsed CLI command and returns the rendered output.
///
/// # Errors
///
/// Returns an error when the corpus cannot be loaded or written, or
/// when the engine operation fails.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::from_flag(cli.json);
    let corpus_path = cli.corpus_path();
    let store = Arc::new(MemoryStore::with_listings(load_corpus(&corpus_path)?));
    let config = AiConfig::from_env();
    let provider: Arc<dyn ModelProvider> = Arc::new(OpenAiProvider::new(&config));

    match &cli.command {
        Commands::Search { query } => {
            let pipeline = RetrievalPipeline::new(engine_store(&store), provider, config);
            let outcome = pipeline.search(query).await?;
            output::format_search(&outcome, format)
        }
        Commands::Similar { id, top_k } => {
            let pipeline = RetrievalPipeline::new(engine_store(&store), provider, config);
            let candidates = pipeline.similar(*id, *top_k).await?;
            output::format_similar(&candidates, format)
        }
        Commands::Assist { message } => {
            let assistant = Assistant::new(engine_store(&store), provider, config);
            let outcome = assistant.assist(message).await?;
            output::format_assist(&outcome, format)
        }
        Commands::Moderate {
            since_days,
            max_listings,
        } => {
            let analyzer = BatchAnalyzer::new(engine_store(&store), provider, config);
            let outcome = analyzer.moderate(*since_days, *max_listings).await?;
            output::format_moderation(&outcome, format)
        }
        Commands::ClaimCheck { id, message } => {
            let analyzer = BatchAnalyzer::new(engine_store(&store), provider, config);
            let outcome = analyzer.claim_check(*id, message).await?;
            output::format_claim_check(&outcome, format)
        }
        Commands::Faq { days } => {
            let analyzer = BatchAnalyzer::new(engine_store(&store), provider, config);
            let outcome = analyzer.faq(*days).await?;
            output::format_faq(&outcome, format)
        }
        Commands::Reindex => {
            let pipeline = RetrievalPipeline::new(engine_store(&store), provider, config);
            let indexed = reindex_and_save(&pipeline, &store, &corpus_path).await?;
            output::format_reindex(indexed, format)
        }
    }
}

/// Coerces the concrete store to the engine's storage trait.
fn engine_store(store: &Arc<MemoryStore>) -> Arc<dyn ListingStore> {
    Arc::clone(store) as Arc<dyn ListingStore>
}

/// Loads a JSON corpus file into listings.
fn load_corpus(path: &Path) -> Result<Vec<Listing>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("corpus file {} is not a JSON listing array", path.display()))
}

/// Writes listings back to the corpus file.
fn save_corpus(path: &Path, listings: &[Listing]) -> Result<()> {
    let raw = serde_json::to_string_pretty(listings).context("failed to encode corpus")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write corpus file {}", path.display()))
}

/// Runs the reindex sweep and writes the corpus back whenever the store
/// gained vectors, before surfacing any sweep error. The engine persists
/// per batch, so a mid-sweep provider failure must not discard batches
/// the store already holds.
async fn reindex_and_save(
    pipeline: &RetrievalPipeline,
    store: &MemoryStore,
    path: &Path,
) -> Result<usize> {
    let embedded_before = count_embedded(&store.snapshot().await);
    let outcome = pipeline.reindex().await;
    let snapshot = store.snapshot().await;
    if count_embedded(&snapshot) > embedded_before {
        save_corpus(path, &snapshot)?;
    }
    Ok(outcome?)
}

fn count_embedded(listings: &[Listing]) -> usize {
    listings.iter().filter(|l| l.embedding.is_some()).count()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::core::ListingKind;
    use crate::error::EngineError;
    use crate::message::{ChatRequest, ChatResponse};

    #[test]
    fn test_corpus_roundtrip() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("listings.json");
        let listing = Listing::new(
            "Dana",
            ListingKind::Lost,
            "Phone",
            "Black phone with cracked screen",
            "Electronics",
            "Gym",
            Utc::now(),
        );

        save_corpus(&path, &[listing.clone()]).unwrap_or_else(|e| panic!("save failed: {e}"));
        let loaded = load_corpus(&path).unwrap_or_else(|e| panic!("load failed: {e}"));

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, listing.id);
        assert_eq!(loaded[0].title, "Phone");
    }

    #[test]
    fn test_load_corpus_missing_file() {
        let result = load_corpus(Path::new("/nonexistent/listings.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_corpus_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("listings.json");
        fs::write(&path, "{\"not\": \"an array\"}")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let result = load_corpus(&path);
        assert!(result.is_err());
    }

    // Offline paths exercise the full command dispatch without credentials.

    #[tokio::test]
    async fn test_execute_faq_fallback_offline() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("listings.json");
        fs::write(&path, "[]").unwrap_or_else(|e| panic!("write failed: {e}"));

        let cli = Cli {
            corpus: Some(path),
            verbose: false,
            json: false,
            command: Commands::Faq { days: 30 },
        };
        let out = execute(&cli)
            .await
            .unwrap_or_else(|e| panic!("execute failed: {e}"));

        assert!(out.contains("What items are commonly lost on campus?"));
    }

    #[tokio::test]
    async fn test_execute_reindex_nothing_to_do() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("listings.json");
        fs::write(&path, "[]").unwrap_or_else(|e| panic!("write failed: {e}"));

        let cli = Cli {
            corpus: Some(path.clone()),
            verbose: false,
            json: false,
            command: Commands::Reindex,
        };
        let out = execute(&cli)
            .await
            .unwrap_or_else(|e| panic!("execute failed: {e}"));

        assert_eq!(out, "No listings needed embedding.");
        // An untouched corpus is not rewritten.
        let raw = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(raw, "[]");
    }

    /// Embeds a fixed vector until its quota runs out, then fails.
    struct LimitedEmbedder {
        remaining: AtomicUsize,
    }

    impl LimitedEmbedder {
        fn new(quota: usize) -> Self {
            Self {
                remaining: AtomicUsize::new(quota),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for LimitedEmbedder {
        fn name(&self) -> &'static str {
            "limited"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, EngineError> {
            Err(EngineError::Provider {
                message: "chat not scripted".to_string(),
                status: None,
            })
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EngineError> {
            if self.remaining.load(Ordering::SeqCst) == 0 {
                return Err(EngineError::Provider {
                    message: "embedding quota exhausted".to_string(),
                    status: Some(429),
                });
            }
            self.remaining.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![0.1, 0.2])
        }
    }

    #[tokio::test]
    async fn test_reindex_failure_keeps_persisted_batches_on_disk() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("listings.json");
        let listings: Vec<Listing> = (0..11)
            .map(|i| {
                Listing::new(
                    "Owner",
                    ListingKind::Lost,
                    format!("Item {i}"),
                    "Missing",
                    "Misc",
                    "Campus",
                    Utc::now(),
                )
            })
            .collect();
        save_corpus(&path, &listings).unwrap_or_else(|e| panic!("save failed: {e}"));

        let store = Arc::new(MemoryStore::with_listings(listings));
        let provider: Arc<dyn ModelProvider> = Arc::new(LimitedEmbedder::new(10));
        let pipeline = RetrievalPipeline::new(engine_store(&store), provider, AiConfig::default());

        // The sweep persists its first batch of ten into the store, then
        // dies on the eleventh embedding.
        let result = reindex_and_save(&pipeline, &store, &path).await;
        assert!(result.is_err());

        // The corpus file still gains the completed batch.
        let on_disk = load_corpus(&path).unwrap_or_else(|e| panic!("load failed: {e}"));
        assert_eq!(on_disk.len(), 11);
        assert_eq!(count_embedded(&on_disk), 10);
    }
}
