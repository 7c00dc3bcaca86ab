//! Aggregate statistics over a set of listings.

use std::collections::BTreeMap;

use serde::Serialize;

use super::listing::{Listing, ListingKind};

/// Grouped counts over a listing set.
///
/// Always computed directly from corpus rows, never from model output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingStats {
    /// Listing count per category, keyed alphabetically.
    pub by_category: BTreeMap<String, usize>,
    /// Listing count per location, keyed alphabetically.
    pub by_location: BTreeMap<String, usize>,
    /// Number of lost-item listings.
    pub lost_count: usize,
    /// Number of found-item listings.
    pub found_count: usize,
}

impl ListingStats {
    /// Aggregates counts over the given listings.
    #[must_use]
    pub fn collect(listings: &[Listing]) -> Self {
        let mut stats = Self::default();
        for listing in listings {
            match listing.kind {
                ListingKind::Lost => stats.lost_count += 1,
                ListingKind::Found => stats.found_count += 1,
            }
            *stats
                .by_category
                .entry(listing.category.clone())
                .or_insert(0) += 1;
            *stats
                .by_location
                .entry(listing.location.clone())
                .or_insert(0) += 1;
        }
        stats
    }
}
