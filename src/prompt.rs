//! System prompts and template builders for model calls.
//!
//! Prompts carry the grounding contract: every model-facing operation
//! embeds corpus data directly in its system prompt and instructs the
//! model to answer from that data alone. Template builders format
//! listing rows into the line shapes each prompt expects.

use crate::core::Listing;

/// Maximum listing rows included in the FAQ data summary.
const FAQ_SUMMARY_LIMIT: usize = 100;

/// Static instruction block for grounded search answers.
const SEARCH_SYSTEM_PROMPT: &str = "You are a campus lost-and-found assistant.
Answer the user's question using ONLY the listings provided below.
Do not use any external knowledge.
If the answer cannot be determined from the listings, say so clearly.
When referencing a listing, include its ID in the format [ID: <id>].";

/// Static instruction block for moderation batches.
const MODERATION_SYSTEM_PROMPT: &str = r#"You are a campus lost-and-found moderation assistant. Be strict.
Analyze the listings below and flag ANY that match one or more of these patterns:
- Gibberish or keyboard-mash in title, description, owner name, or location
- Placeholder or test text (e.g. "test", "string test", "lorem ipsum")
- Suspiciously short or meaningless owner names
- Repeated identical phrases within a single field
- External links, URLs, or contact info that looks like a scam
- Inappropriate or harmful content

Return ONLY valid JSON in this exact format:
{
  "flagged": [
    {"listingId": "<exact-guid-from-input>", "reason": "<specific reason>", "severity": "low|medium|high"}
  ]
}
If nothing matches return {"flagged": []}.
Only use IDs that appear verbatim in the input."#;

/// User message sent with every moderation batch.
pub const MODERATION_USER_PROMPT: &str =
    "Analyze these listings for suspicious or harmful content.";

/// Builds the system prompt for a grounded search answer.
///
/// Each listing becomes one context line of the form
/// `[ID: <uuid>] <title> - <description>`; the id format is what the
/// citation scan later looks for.
#[must_use]
pub fn search_system_prompt(listings: &[Listing]) -> String {
    let context = listings
        .iter()
        .map(|l| format!("[ID: {}] {} - {}", l.id, l.title, l.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{SEARCH_SYSTEM_PROMPT}\n\nListings:\n{context}")
}

/// Builds the system prompt for one moderation batch.
///
/// Only ids listed here are valid in the model's response; the parser
/// drops anything else.
#[must_use]
pub fn moderation_system_prompt(batch: &[Listing]) -> String {
    let context = batch
        .iter()
        .map(|l| {
            format!(
                "[ID: {}] type={} | owner={} | title={} | desc={} | category={} | location={}",
                l.id,
                l.kind.as_str(),
                l.owner_name,
                l.title,
                l.description,
                l.category,
                l.location
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{MODERATION_SYSTEM_PROMPT}\n\nListings:\n{context}")
}

/// Builds the system prompt for a claim quality check against a listing.
#[must_use]
pub fn claim_check_system_prompt(listing: &Listing) -> String {
    format!(
        r#"You are a campus lost-and-found assistant evaluating claim message quality.
Assess the claim message against the listing details below.
Return ONLY valid JSON in this exact format:
{{
  "score": <integer 0-100>,
  "issues": ["<issue1>", "<issue2>"],
  "suggestions": ["<suggestion1>", "<suggestion2>"],
  "improvedMessage": "<rewritten claim message>"
}}
Rules:
- Do not invent facts not present in the listing or claim.
- Score higher when the claimant provides specific distinguishing marks, proof, time, or location details.
- List issues: what is vague or missing.
- List suggestions: ask for specifics.
- ImprovedMessage: rewrite the claim incorporating the suggested improvements.

Listing:
Title: {title}
Type: {kind}
Description: {description}
Category: {category}
Location: {location}"#,
        title = listing.title,
        kind = listing.kind.as_str(),
        description = listing.description,
        category = listing.category,
        location = listing.location,
    )
}

/// Builds the user message carrying the claim text.
#[must_use]
pub fn claim_check_user_prompt(message: &str) -> String {
    format!("Claim message: {message}")
}

/// Builds the system prompt for FAQ synthesis over a listing window.
///
/// The data summary is capped at the first 100 rows to bound prompt size.
#[must_use]
pub fn faq_system_prompt(days: i64, listings: &[Listing]) -> String {
    let summary = listings
        .iter()
        .take(FAQ_SUMMARY_LIMIT)
        .map(|l| {
            format!(
                "{} | {} | {} | {}",
                l.kind.as_str(),
                l.category,
                l.location,
                l.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are a campus lost-and-found assistant generating a data-grounded FAQ.
Based ONLY on the listing data below (last {days} days), generate 5 to 8 useful FAQ entries.
Return ONLY valid JSON in this exact format:
{{
  "faq": [
    {{"q": "<question>", "a": "<answer>"}}
  ]
}}

Data (last {days} days):
{summary}"#
    )
}

/// Builds the user message for FAQ synthesis.
#[must_use]
pub fn faq_user_prompt(days: i64) -> String {
    format!("Generate a campus lost-and-found FAQ from the last {days} days of data.")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::core::ListingKind;

    use super::*;

    fn listing(kind: ListingKind, title: &str) -> Listing {
        Listing::new(
            "Dana",
            kind,
            title,
            format!("{title} description"),
            "Electronics",
            "Main Library",
            Utc::now(),
        )
    }

    #[test]
    fn test_search_prompt_has_context_lines() {
        let listings = vec![listing(ListingKind::Lost, "Phone")];
        let prompt = search_system_prompt(&listings);
        assert!(prompt.contains("using ONLY the listings provided below"));
        assert!(prompt.contains(&format!("[ID: {}] Phone - Phone description", listings[0].id)));
        assert!(prompt.contains("[ID: <id>]"));
    }

    #[test]
    fn test_moderation_prompt_embeds_batch_fields() {
        let listings = vec![listing(ListingKind::Found, "Wallet")];
        let prompt = moderation_system_prompt(&listings);
        assert!(prompt.contains("Be strict."));
        assert!(prompt.contains(&format!("[ID: {}] type=Found | owner=Dana", listings[0].id)));
        assert!(prompt.contains(r#"{"flagged": []}"#));
        assert!(prompt.contains("appear verbatim in the input"));
    }

    #[test]
    fn test_claim_check_prompt_embeds_listing_block() {
        let l = listing(ListingKind::Lost, "Calculator");
        let prompt = claim_check_system_prompt(&l);
        assert!(prompt.contains("Title: Calculator"));
        assert!(prompt.contains("Type: Lost"));
        assert!(prompt.contains("Location: Main Library"));
        assert!(prompt.contains("improvedMessage"));
    }

    #[test]
    fn test_claim_check_user_prompt() {
        assert_eq!(
            claim_check_user_prompt("it has my sticker"),
            "Claim message: it has my sticker"
        );
    }

    #[test]
    fn test_faq_prompt_interpolates_days() {
        let listings = vec![listing(ListingKind::Lost, "Umbrella")];
        let prompt = faq_system_prompt(30, &listings);
        assert!(prompt.contains("last 30 days"));
        assert!(prompt.contains("Lost | Electronics | Main Library | Umbrella"));
        assert!(prompt.contains(r#""faq""#));
    }

    #[test]
    fn test_faq_summary_caps_at_one_hundred_rows() {
        let listings: Vec<Listing> = (0..150)
            .map(|i| listing(ListingKind::Found, &format!("Item{i}")))
            .collect();
        let prompt = faq_system_prompt(7, &listings);
        let summary_lines = prompt
            .lines()
            .filter(|line| line.starts_with("Found | "))
            .count();
        assert_eq!(summary_lines, 100);
        assert!(prompt.contains("| Item99"));
        assert!(!prompt.contains("| Item100"));
    }

    #[test]
    fn test_faq_user_prompt() {
        assert_eq!(
            faq_user_prompt(14),
            "Generate a campus lost-and-found FAQ from the last 14 days of data."
        );
    }
}
