//! Retrieval pipeline: keyword recall, semantic rerank, grounded answers.
//!
//! The pipeline wires the listing store, the model provider, and the
//! rerank stage into the engine's read paths (search, similar, reindex)
//! plus the best-effort write-path indexing hook. Recall is keyword-first
//! with a recency fallback, so the semantic stage always receives a
//! bounded candidate pool instead of the whole corpus.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::citation::extract_citations;
use crate::config::AiConfig;
use crate::core::Listing;
use crate::error::{EngineError, Result};
use crate::message::{ChatRequest, system_message, user_message};
use crate::prompt;
use crate::provider::ModelProvider;
use crate::rerank::{Candidate, rerank};
use crate::store::{ListingFilter, ListingOrder, ListingQuery, ListingStore};

/// How many unindexed listings are embedded between persistence points
/// during a reindex sweep.
const REINDEX_BATCH_SIZE: usize = 10;

/// Outcome of a retrieval-augmented search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// The grounded answer text.
    pub answer: String,
    /// Reranked listings the answer was grounded on, best match first.
    /// Returned without embedding vectors.
    pub matches: Vec<Listing>,
    /// Ids from `matches` that the answer actually references, in rank
    /// order.
    pub cited_ids: Vec<Uuid>,
}

/// Embedding-backed retrieval over the listing corpus.
pub struct RetrievalPipeline {
    store: Arc<dyn ListingStore>,
    provider: Arc<dyn ModelProvider>,
    config: AiConfig,
}

impl RetrievalPipeline {
    /// Creates a pipeline over the given store and provider.
    #[must_use]
    pub fn new(
        store: Arc<dyn ListingStore>,
        provider: Arc<dyn ModelProvider>,
        config: AiConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Answers a free-text query with an answer grounded in reranked
    /// listings.
    ///
    /// Recall is keyword-first over indexed listings, newest event first.
    /// When keywords match nothing, the pool falls back to the newest
    /// indexed listings so the semantic stage still has material to rank.
    /// The completion runs at temperature zero and is instructed to cite
    /// listing ids inline; cited ids are extracted from the answer text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank query before any
    /// external call, and propagates store or provider failures.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::Validation {
                message: "search query must not be empty".to_string(),
            });
        }

        let candidates = self.candidates_for(query).await?;
        debug!(count = candidates.len(), "recalled candidate listings");

        let query_embedding = self.provider.embed(query).await?;
        let ranked = rerank(&query_embedding, &candidates, self.config.top_k);
        let matches: Vec<Listing> = ranked
            .into_iter()
            .map(|c| {
                // Vectors never leave the engine.
                let mut listing = c.listing;
                listing.embedding = None;
                listing
            })
            .collect();

        let request = ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![
                system_message(&prompt::search_system_prompt(&matches)),
                user_message(query),
            ],
            temperature: Some(0.0),
            max_tokens: None,
            json_mode: false,
            tools: Vec::new(),
        };
        let response = self.provider.chat(&request).await?;
        let answer = response.content.trim().to_string();

        let cited_ids = extract_citations(&answer, matches.iter().map(|l| l.id));
        Ok(SearchOutcome {
            answer,
            matches,
            cited_ids,
        })
    }

    /// Recalls up to `candidate_pool` indexed listings for a query.
    async fn candidates_for(&self, query: &str) -> Result<Vec<Listing>> {
        let keyword = ListingQuery {
            filter: ListingFilter {
                text_contains: Some(query.to_string()),
                embedded: Some(true),
                ..ListingFilter::default()
            },
            order: ListingOrder::EventDateDesc,
            skip: 0,
            take: Some(self.config.candidate_pool),
        };
        let page = self.store.query_listings(&keyword).await?;
        if !page.items.is_empty() {
            return Ok(page.items);
        }

        // Keyword recall found nothing; fall back to the newest indexed
        // listings so the rerank stage still has a pool.
        let fallback = ListingQuery {
            filter: ListingFilter {
                embedded: Some(true),
                ..ListingFilter::default()
            },
            order: ListingOrder::EventDateDesc,
            skip: 0,
            take: Some(self.config.candidate_pool),
        };
        let page = self.store.query_listings(&fallback).await?;
        Ok(page.items)
    }

    /// Finds the `k` listings most similar to an existing listing.
    ///
    /// Uses the stored vector when the listing is indexed and embeds its
    /// composed text on the fly otherwise. An absent id yields an empty
    /// result without touching the provider.
    ///
    /// # Errors
    ///
    /// Propagates store failures and embedding failures for unindexed
    /// source listings.
    pub async fn similar(&self, id: Uuid, k: usize) -> Result<Vec<Candidate>> {
        let Some(listing) = self.store.find_listing(id).await? else {
            return Ok(Vec::new());
        };

        let query_embedding = match listing.embedding {
            Some(vector) => vector,
            None => self.provider.embed(&listing.embedding_text()).await?,
        };

        let query = ListingQuery {
            filter: ListingFilter {
                embedded: Some(true),
                exclude_id: Some(id),
                ..ListingFilter::default()
            },
            order: ListingOrder::EventDateDesc,
            skip: 0,
            take: Some(self.config.candidate_pool),
        };
        let page = self.store.query_listings(&query).await?;

        let mut ranked = rerank(&query_embedding, &page.items, k);
        for candidate in &mut ranked {
            candidate.listing.embedding = None;
        }
        Ok(ranked)
    }

    /// Indexes a listing in place, best effort.
    ///
    /// Embedding failure is logged and leaves the listing unindexed for
    /// a later [`reindex`](Self::reindex) sweep to heal; write paths
    /// never fail on provider errors.
    pub async fn embed_new(&self, listing: &mut Listing) {
        match self.provider.embed(&listing.embedding_text()).await {
            Ok(vector) => listing.embedding = Some(vector),
            Err(e) => {
                warn!(
                    listing_id = %listing.id,
                    error = %e,
                    "embedding failed; listing stays unindexed"
                );
            }
        }
    }

    /// Embeds every unindexed listing, persisting after each batch.
    ///
    /// Returns the number of listings newly indexed. A provider failure
    /// mid-sweep aborts the run but keeps every batch already persisted,
    /// so the sweep is resumable.
    ///
    /// # Errors
    ///
    /// Propagates store failures and the first embedding failure.
    pub async fn reindex(&self) -> Result<usize> {
        let query = ListingQuery {
            filter: ListingFilter {
                embedded: Some(false),
                ..ListingFilter::default()
            },
            ..ListingQuery::default()
        };
        let unindexed = self.store.query_listings(&query).await?.items;

        let mut indexed = 0;
        for batch in unindexed.chunks(REINDEX_BATCH_SIZE) {
            let mut updated = Vec::with_capacity(batch.len());
            for listing in batch {
                let vector = self.provider.embed(&listing.embedding_text()).await?;
                let mut listing = listing.clone();
                listing.embedding = Some(vector);
                updated.push(listing);
            }
            for listing in &updated {
                self.store.save_listing(listing).await?;
            }
            indexed += updated.len();
            debug!(indexed, "reindex batch persisted");
        }
        Ok(indexed)
    }
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
