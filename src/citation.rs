//! Citation extraction from grounded answers.
//!
//! The grounding prompts instruct the model to reference listings as
//! `[ID: <uuid>]`, but models paraphrase, so extraction is a plain
//! case-insensitive substring scan for each candidate id rather than a
//! format-anchored parse. Ids come back in the order they were supplied.

use uuid::Uuid;

/// Returns every id whose canonical hyphenated form appears in `answer`,
/// matched case-insensitively, preserving the input order.
#[must_use]
pub fn extract_citations<I>(answer: &str, ids: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    let answer_lower = answer.to_lowercase();
    ids.into_iter()
        .filter(|id| answer_lower.contains(&id.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_extracts_cited_ids_only() {
        let cited = id(1);
        let uncited = id(2);
        let answer = format!("The backpack is listed under [ID: {cited}].");

        let citations = extract_citations(&answer, vec![cited, uncited]);
        assert_eq!(citations, vec![cited]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let listing_id = id(0xABCD_EF01_2345);
        let answer = format!("See {}", listing_id.to_string().to_uppercase());

        let citations = extract_citations(&answer, vec![listing_id]);
        assert_eq!(citations, vec![listing_id]);
    }

    #[test]
    fn test_match_does_not_require_id_marker() {
        let listing_id = id(7);
        let answer = format!("the listing {listing_id} looks like a match");

        let citations = extract_citations(&answer, vec![listing_id]);
        assert_eq!(citations, vec![listing_id]);
    }

    #[test]
    fn test_preserves_input_order() {
        let first = id(10);
        let second = id(20);
        let answer = format!("{second} then {first}");

        let citations = extract_citations(&answer, vec![first, second]);
        assert_eq!(citations, vec![first, second]);
    }

    #[test]
    fn test_empty_answer_has_no_citations() {
        let citations = extract_citations("", vec![id(1), id(2)]);
        assert!(citations.is_empty());
    }
}
