//! Batch analysis over the listing corpus: moderation sweeps, claim
//! quality checks, and FAQ synthesis.
//!
//! All three operations share one shape: build a strict-JSON system
//! prompt, send one completion per batch, and parse the reply
//! permissively. Missing or malformed fields degrade to defaults; ids
//! the model did not receive are dropped; only a structurally
//! undecodable reply is fatal.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::AiConfig;
use crate::core::{Listing, ListingStats, Severity};
use crate::error::{EngineError, Result};
use crate::message::{ChatRequest, system_message, user_message};
use crate::prompt;
use crate::provider::ModelProvider;
use crate::store::{ListingFilter, ListingOrder, ListingQuery, ListingStore};

/// Listings per completion call during a moderation sweep.
const LLM_BATCH_SIZE: usize = 50;
/// Window applied when the caller passes a non-positive day count.
const DEFAULT_MODERATION_WINDOW_DAYS: i64 = 7;
/// Cap applied when the caller passes a non-positive listing cap.
const DEFAULT_MODERATION_MAX_LISTINGS: usize = 200;
/// Sampling temperature for FAQ synthesis. Moderation and claim checks
/// run at zero.
const FAQ_TEMPERATURE: f32 = 0.3;

/// A listing flagged by a moderation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedListing {
    /// Id of the flagged listing.
    pub listing_id: Uuid,
    /// Model-provided reason for the flag.
    pub reason: String,
    /// Flag severity.
    pub severity: Severity,
}

/// Outcome of a moderation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationOutcome {
    /// Flagged listings across all batches, in batch order.
    pub flagged: Vec<FlaggedListing>,
    /// Aggregate summary with per-severity counts.
    pub summary: String,
}

/// Outcome of a claim quality check.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimCheckOutcome {
    /// Claim quality score, clamped to 0..=100.
    pub score: i64,
    /// What is vague or missing in the claim.
    pub issues: Vec<String>,
    /// What the claimant should add or clarify.
    pub suggestions: Vec<String>,
    /// The claim rewritten with the suggested improvements.
    pub improved_message: String,
}

/// One generated FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    /// Question text.
    pub q: String,
    /// Answer text.
    pub a: String,
}

/// Outcome of FAQ synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct FaqOutcome {
    /// Generated entries, or the static fallback pair when the window
    /// held no listings.
    pub faq: Vec<FaqEntry>,
    /// Statistics computed directly from the windowed listings.
    pub stats: ListingStats,
}

/// Batch analyzer over the listing corpus.
pub struct BatchAnalyzer {
    store: Arc<dyn ListingStore>,
    provider: Arc<dyn ModelProvider>,
    config: AiConfig,
}

impl BatchAnalyzer {
    /// Creates an analyzer over the given store and provider.
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

    /// Sweeps recently created listings for suspicious content.
    ///
    /// Non-positive `since_days` or `max_listings` fall back to 7 days
    /// and 200 listings. The windowed set is analyzed in batches of
    /// [`LLM_BATCH_SIZE`]; each batch is an independent completion call
    /// and flags are merged in batch order. An empty window returns a
    /// "no data" summary without calling the model.
    ///
    /// # Errors
    ///
    /// Propagates store and provider failures; an undecodable model
    /// reply surfaces as [`EngineError::ResponseParse`].
    pub async fn moderate(&self, since_days: i64, max_listings: usize) -> Result<ModerationOutcome> {
        let since_days = if since_days < 1 {
            DEFAULT_MODERATION_WINDOW_DAYS
        } else {
            since_days
        };
        let max_listings = if max_listings < 1 {
            DEFAULT_MODERATION_MAX_LISTINGS
        } else {
            max_listings
        };
        let span = Duration::try_days(since_days).ok_or_else(|| EngineError::Validation {
            message: format!("moderation window out of range: {since_days} days"),
        })?;

        let query = ListingQuery {
            filter: ListingFilter {
                created_since: Some(Utc::now() - span),
                ..ListingFilter::default()
            },
            order: ListingOrder::CreatedAtDesc,
            skip: 0,
            take: Some(max_listings),
        };
        let listings = self.store.query_listings(&query).await?.items;

        if listings.is_empty() {
            return Ok(ModerationOutcome {
                flagged: Vec::new(),
                summary: "No listings found in the specified time range.".to_string(),
            });
        }

        let mut flagged = Vec::new();
        for batch in listings.chunks(LLM_BATCH_SIZE) {
            flagged.extend(self.moderate_batch(batch).await?);
        }

        let summary = moderation_summary(listings.len(), &flagged);
        Ok(ModerationOutcome { flagged, summary })
    }

    /// Analyzes one batch and returns its validated flags.
    async fn moderate_batch(&self, batch: &[Listing]) -> Result<Vec<FlaggedListing>> {
        debug!(batch_len = batch.len(), "moderating listing batch");
        let request = self.json_request(
            &prompt::moderation_system_prompt(batch),
            prompt::MODERATION_USER_PROMPT,
            0.0,
        );
        let response = self.provider.chat(&request).await?;
        let root = parse_model_json(&response.content)?;

        let valid_ids: HashSet<Uuid> = batch.iter().map(|l| l.id).collect();
        let mut flagged = Vec::new();
        let Some(items) = root.get("flagged").and_then(Value::as_array) else {
            return Ok(flagged);
        };
        for item in items {
            // Ids the model invented, or failed to echo verbatim, are
            // dropped silently.
            let Some(id) = item
                .get("listingId")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
            else {
                continue;
            };
            if !valid_ids.contains(&id) {
                continue;
            }
            flagged.push(FlaggedListing {
                listing_id: id,
                reason: item
                    .get("reason")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                severity: Severity::parse(
                    item.get("severity").and_then(Value::as_str).unwrap_or("low"),
                ),
            });
        }
        Ok(flagged)
    }

    /// Scores a proposed claim message against its listing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank message and
    /// [`EngineError::NotFound`] for an absent listing, both before any
    /// external call. Provider failures and undecodable replies
    /// propagate.
    pub async fn claim_check(&self, listing_id: Uuid, message: &str) -> Result<ClaimCheckOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(EngineError::Validation {
                message: "claim message must not be empty".to_string(),
            });
        }
        let listing = self
            .store
            .find_listing(listing_id)
            .await?
            .ok_or(EngineError::NotFound { id: listing_id })?;

        let request = self.json_request(
            &prompt::claim_check_system_prompt(&listing),
            &prompt::claim_check_user_prompt(message),
            0.0,
        );
        let response = self.provider.chat(&request).await?;
        let root = parse_model_json(&response.content)?;

        Ok(ClaimCheckOutcome {
            score: root
                .get("score")
                .and_then(Value::as_i64)
                .unwrap_or(0)
                .clamp(0, 100),
            issues: string_array(&root, "issues"),
            suggestions: string_array(&root, "suggestions"),
            improved_message: root
                .get("improvedMessage")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Synthesizes FAQ entries from the recent event window.
    ///
    /// Statistics are always computed from the windowed listings
    /// themselves. An empty window returns the static fallback entries
    /// without calling the model; otherwise one completion call
    /// generates 5 to 8 entries from a summary truncated to the first
    /// 100 listings.
    ///
    /// # Errors
    ///
    /// Propagates store and provider failures; an undecodable model
    /// reply surfaces as [`EngineError::ResponseParse`].
    pub async fn faq(&self, days: i64) -> Result<FaqOutcome> {
        let span = Duration::try_days(days).ok_or_else(|| EngineError::Validation {
            message: format!("faq window out of range: {days} days"),
        })?;
        let query = ListingQuery {
            filter: ListingFilter {
                event_since: Some(Utc::now() - span),
                ..ListingFilter::default()
            },
            ..ListingQuery::default()
        };
        let listings = self.store.query_listings(&query).await?.items;
        let stats = ListingStats::collect(&listings);

        if listings.is_empty() {
            return Ok(FaqOutcome {
                faq: fallback_faq(),
                stats,
            });
        }

        debug!(listing_count = listings.len(), days, "synthesizing faq");
        let request = self.json_request(
            &prompt::faq_system_prompt(days, &listings),
            &prompt::faq_user_prompt(days),
            FAQ_TEMPERATURE,
        );
        let response = self.provider.chat(&request).await?;
        let root = parse_model_json(&response.content)?;

        let mut faq = Vec::new();
        if let Some(items) = root.get("faq").and_then(Value::as_array) {
            for item in items {
                let q = item.get("q").and_then(Value::as_str).unwrap_or_default();
                let a = item.get("a").and_then(Value::as_str).unwrap_or_default();
                // Entries without a question are useless downstream.
                if !q.trim().is_empty() {
                    faq.push(FaqEntry {
                        q: q.to_string(),
                        a: a.to_string(),
                    });
                }
            }
        }
        Ok(FaqOutcome { faq, stats })
    }

    /// Builds a JSON-mode completion request with a system/user pair.
    fn json_request(&self, system: &str, user: &str, temperature: f32) -> ChatRequest {
        ChatRequest {
            model: self.config.chat_model.clone(),
            messages: vec![system_message(system), user_message(user)],
            temperature: Some(temperature),
            max_tokens: None,
            json_mode: true,
            tools: Vec::new(),
        }
    }
}

impl std::fmt::Debug for BatchAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchAnalyzer")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Formats the aggregate moderation summary line.
fn moderation_summary(analyzed: usize, flagged: &[FlaggedListing]) -> String {
    if flagged.is_empty() {
        return format!("Analyzed {analyzed} listing(s). No suspicious items detected.");
    }
    let count_of = |s: Severity| flagged.iter().filter(|f| f.severity == s).count();
    format!(
        "Analyzed {analyzed} listing(s). Flagged {}: {} high, {} medium, {} low severity.",
        flagged.len(),
        count_of(Severity::High),
        count_of(Severity::Medium),
        count_of(Severity::Low)
    )
}

/// The static FAQ pair returned when the window holds no listings.
fn fallback_faq() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            q: "What items are commonly lost on campus?".to_string(),
            a: "No data available for the selected period.".to_string(),
        },
        FaqEntry {
            q: "What should I do if I lose something?".to_string(),
            a: "Post a listing on this Lost & Found board and check the Found items section."
                .to_string(),
        },
    ]
}

/// Parses a model reply expected to be a JSON object.
///
/// Strips Markdown code fences some models wrap around JSON output.
/// Anything still undecodable is fatal for the operation.
fn parse_model_json(content: &str) -> Result<Value> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let stripped = stripped.strip_suffix("```").unwrap_or(stripped).trim();

    serde_json::from_str(stripped).map_err(|e| EngineError::ResponseParse {
        message: format!("model returned undecodable JSON: {e}"),
        content: truncate_for_error(content),
    })
}

/// Caps raw model content carried inside parse errors.
fn truncate_for_error(content: &str) -> String {
    const MAX: usize = 200;
    if content.len() <= MAX {
        return content.to_string();
    }
    let mut end = MAX;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}

/// Reads an array of strings from a model reply, defaulting to empty.
fn string_array(root: &Value, key: &str) -> Vec<String> {
    root.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}
