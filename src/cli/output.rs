//! Output rendering for CLI results.
//!
//! Every command renders either a human-readable text block or pretty
//! JSON, chosen by the global `--json` flag. JSON output serializes the
//! engine outcome types directly, so scripted consumers see the same
//! shapes the library API returns.

#![allow(clippy::format_push_string)]

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use crate::analysis::{ClaimCheckOutcome, FaqOutcome, ModerationOutcome};
use crate::assist::AssistOutcome;
use crate::core::Listing;
use crate::rerank::Candidate;
use crate::search::SearchOutcome;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable pretty JSON.
    Json,
}

impl OutputFormat {
    /// Maps the global `--json` flag to a format.
    #[must_use]
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One-line text rendering of a listing in result lists.
fn listing_line(listing: &Listing) -> String {
    format!(
        "[{}] {} - {} @ {} ({}) id={}",
        listing.kind.as_str(),
        listing.title,
        listing.category,
        listing.location,
        listing.event_date.format("%Y-%m-%d"),
        listing.id
    )
}

/// Renders a grounded search outcome.
pub fn format_search(outcome: &SearchOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }
    let mut out = String::new();
    out.push_str(&outcome.answer);
    out.push('\n');
    if !outcome.matches.is_empty() {
        out.push_str("\nMatches:\n");
        for (i, listing) in outcome.matches.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, listing_line(listing)));
        }
    }
    if !outcome.cited_ids.is_empty() {
        let ids: Vec<String> = outcome.cited_ids.iter().map(ToString::to_string).collect();
        out.push_str(&format!("\nCited: {}\n", ids.join(", ")));
    }
    Ok(out.trim_end().to_string())
}

/// Renders scored similar-listing candidates.
pub fn format_similar(candidates: &[Candidate], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&candidates);
    }
    if candidates.is_empty() {
        return Ok("No similar listings found.".to_string());
    }
    let mut out = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        out.push_str(&format!(
            "  {}. ({:.3}) {}\n",
            i + 1,
            candidate.score,
            listing_line(&candidate.listing)
        ));
    }
    Ok(out.trim_end().to_string())
}

/// Renders an assistant outcome with its tool log.
pub fn format_assist(outcome: &AssistOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }
    let mut out = String::new();
    out.push_str(&outcome.answer);
    out.push('\n');
    if !outcome.tool_calls.is_empty() {
        out.push_str("\nTools used:\n");
        for call in &outcome.tool_calls {
            out.push_str(&format!("  - {} {}\n", call.tool, call.args));
        }
    }
    if !outcome.cited_ids.is_empty() {
        let ids: Vec<String> = outcome.cited_ids.iter().map(ToString::to_string).collect();
        out.push_str(&format!("\nCited: {}\n", ids.join(", ")));
    }
    Ok(out.trim_end().to_string())
}

/// Renders a moderation sweep outcome.
pub fn format_moderation(outcome: &ModerationOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }
    let mut out = String::new();
    out.push_str(&outcome.summary);
    out.push('\n');
    if !outcome.flagged.is_empty() {
        out.push_str("\nFlagged:\n");
        for flag in &outcome.flagged {
            out.push_str(&format!(
                "  - [{}] {}: {}\n",
                flag.severity, flag.listing_id, flag.reason
            ));
        }
    }
    Ok(out.trim_end().to_string())
}

/// Renders a claim quality check outcome.
pub fn format_claim_check(outcome: &ClaimCheckOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }
    let mut out = format!("Score: {}/100\n", outcome.score);
    if !outcome.issues.is_empty() {
        out.push_str("\nIssues:\n");
        for issue in &outcome.issues {
            out.push_str(&format!("  - {issue}\n"));
        }
    }
    if !outcome.suggestions.is_empty() {
        out.push_str("\nSuggestions:\n");
        for suggestion in &outcome.suggestions {
            out.push_str(&format!("  - {suggestion}\n"));
        }
    }
    if !outcome.improved_message.is_empty() {
        out.push_str(&format!("\nImproved message:\n  {}\n", outcome.improved_message));
    }
    Ok(out.trim_end().to_string())
}

/// Comma-joined `name (count)` list ordered most-common-first; ties
/// break on the name.
fn ranked_counts(counts: &BTreeMap<String, usize>) -> String {
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .iter()
        .map(|(name, count)| format!("{name} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders FAQ entries and the corpus statistics beneath them.
pub fn format_faq(outcome: &FaqOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }
    let mut out = String::new();
    for entry in &outcome.faq {
        out.push_str(&format!("Q: {}\nA: {}\n\n", entry.q, entry.a));
    }
    out.push_str(&format!(
        "Lost: {}  Found: {}\n",
        outcome.stats.lost_count, outcome.stats.found_count
    ));
    if !outcome.stats.by_category.is_empty() {
        out.push_str(&format!(
            "By category: {}\n",
            ranked_counts(&outcome.stats.by_category)
        ));
    }
    if !outcome.stats.by_location.is_empty() {
        out.push_str(&format!(
            "By location: {}\n",
            ranked_counts(&outcome.stats.by_location)
        ));
    }
    Ok(out.trim_end().to_string())
}

/// Renders the reindex result.
pub fn format_reindex(indexed: usize, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&json!({ "indexed": indexed }));
    }
    if indexed == 0 {
        return Ok("No listings needed embedding.".to_string());
    }
    Ok(format!(
        "Embedded {indexed} listing(s) and updated the corpus file."
    ))
}
