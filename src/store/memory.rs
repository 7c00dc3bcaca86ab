//! In-memory [`ListingStore`] implementation.
//!
//! Uses `Vec` behind `tokio::sync::RwLock`. Ordering is a stable sort,
//! so rows with equal keys keep their insertion order. This backs the
//! CLI (which loads a JSON corpus file) and the test suite.

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{Claim, Listing};
use crate::error::StoreError;

use super::{ListingFilter, ListingOrder, ListingPage, ListingQuery, ListingStore};

/// In-memory store over a loaded listing corpus.
#[derive(Debug, Default)]
pub struct MemoryStore {
    listings: RwLock<Vec<Listing>>,
    claims: RwLock<Vec<Claim>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given listings.
    #[must_use]
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            claims: RwLock::new(Vec::new()),
        }
    }

    /// Returns a copy of every stored listing in insertion order.
    ///
    /// The CLI uses this to write the corpus file back after reindexing.
    pub async fn snapshot(&self) -> Vec<Listing> {
        self.listings.read().await.clone()
    }

    /// Returns a copy of every stored claim in insertion order.
    pub async fn claims_snapshot(&self) -> Vec<Claim> {
        self.claims.read().await.clone()
    }
}

fn matches(listing: &Listing, filter: &ListingFilter, needle_lower: Option<&str>) -> bool {
    if let Some(kind) = filter.kind {
        if listing.kind != kind {
            return false;
        }
    }
    if let Some(needle) = needle_lower {
        if !listing.matches_text(needle) {
            return false;
        }
    }
    if let Some(since) = filter.event_since {
        if listing.event_date < since {
            return false;
        }
    }
    if let Some(before) = filter.event_before {
        if listing.event_date >= before {
            return false;
        }
    }
    if let Some(since) = filter.created_since {
        if listing.created_at < since {
            return false;
        }
    }
    if let Some(embedded) = filter.embedded {
        if listing.embedding.is_some() != embedded {
            return false;
        }
    }
    if let Some(excluded) = filter.exclude_id {
        if listing.id == excluded {
            return false;
        }
    }
    true
}

#[async_trait::async_trait]
impl ListingStore for MemoryStore {
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn query_listings(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        let needle_lower = query
            .filter
            .text_contains
            .as_deref()
            .map(str::to_lowercase);
        let listings = self.listings.read().await;

        let mut filtered: Vec<&Listing> = listings
            .iter()
            .filter(|l| matches(l, &query.filter, needle_lower.as_deref()))
            .collect();

        match query.order {
            ListingOrder::EventDateDesc => {
                filtered.sort_by(|a, b| b.event_date.cmp(&a.event_date));
            }
            ListingOrder::CreatedAtDesc => {
                filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
        }

        let total = filtered.len() as u64;
        let items: Vec<Listing> = filtered
            .into_iter()
            .skip(query.skip)
            .take(query.take.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(ListingPage { items, total })
    }

    async fn save_listing(&self, listing: &Listing) -> Result<(), StoreError> {
        let mut listings = self.listings.write().await;
        if let Some(existing) = listings.iter_mut().find(|l| l.id == listing.id) {
            *existing = listing.clone();
        } else {
            listings.push(listing.clone());
        }
        Ok(())
    }

    async fn save_claim(&self, claim: &Claim) -> Result<(), StoreError> {
        let mut claims = self.claims.write().await;
        if let Some(existing) = claims.iter_mut().find(|c| c.id == claim.id) {
            *existing = claim.clone();
        } else {
            claims.push(claim.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::core::{ClaimStatus, ListingKind};

    use super::*;

    fn listing(kind: ListingKind, title: &str, days_ago: i64) -> Listing {
        let mut l = Listing::new(
            "Owner",
            kind,
            title,
            format!("{title} description"),
            "Misc",
            "Student Center",
            Utc::now() - Duration::days(days_ago),
        );
        l.created_at = Utc::now() - Duration::days(days_ago);
        l.updated_at = l.created_at;
        l
    }

    async fn query(store: &MemoryStore, q: ListingQuery) -> ListingPage {
        store
            .query_listings(&q)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e}"))
    }

    #[tokio::test]
    async fn test_find_listing_by_id() {
        let l = listing(ListingKind::Lost, "Umbrella", 1);
        let id = l.id;
        let store = MemoryStore::with_listings(vec![l]);

        let found = store
            .find_listing(id)
            .await
            .unwrap_or_else(|e| panic!("find failed: {e}"));
        assert_eq!(found.map(|l| l.id), Some(id));

        let missing = store
            .find_listing(Uuid::new_v4())
            .await
            .unwrap_or_else(|e| panic!("find failed: {e}"));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_query_filters_by_kind() {
        let store = MemoryStore::with_listings(vec![
            listing(ListingKind::Lost, "Phone", 1),
            listing(ListingKind::Found, "Wallet", 2),
            listing(ListingKind::Lost, "Scarf", 3),
        ]);

        let page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    kind: Some(ListingKind::Lost),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|l| l.kind == ListingKind::Lost));
    }

    #[tokio::test]
    async fn test_query_text_match_is_case_insensitive() {
        let store = MemoryStore::with_listings(vec![
            listing(ListingKind::Lost, "AirPods Pro", 1),
            listing(ListingKind::Found, "Textbook", 2),
        ]);

        let page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    text_contains: Some("airpods".to_string()),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "AirPods Pro");
    }

    #[tokio::test]
    async fn test_query_orders_by_event_date_desc() {
        let store = MemoryStore::with_listings(vec![
            listing(ListingKind::Lost, "Oldest", 10),
            listing(ListingKind::Lost, "Newest", 1),
            listing(ListingKind::Lost, "Middle", 5),
        ]);

        let page = query(&store, ListingQuery::default()).await;
        let titles: Vec<&str> = page.items.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    }

    #[tokio::test]
    async fn test_query_pagination_keeps_full_total() {
        let listings: Vec<Listing> = (0..7)
            .map(|i| listing(ListingKind::Found, &format!("Item {i}"), i))
            .collect();
        let store = MemoryStore::with_listings(listings);

        let page = query(
            &store,
            ListingQuery {
                skip: 3,
                take: Some(2),
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_query_filters_by_embedded() {
        let mut indexed = listing(ListingKind::Lost, "Indexed", 1);
        indexed.embedding = Some(vec![0.1, 0.2]);
        let store = MemoryStore::with_listings(vec![
            indexed,
            listing(ListingKind::Lost, "Unindexed", 2),
        ]);

        let embedded_page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    embedded: Some(true),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(embedded_page.total, 1);
        assert_eq!(embedded_page.items[0].title, "Indexed");

        let unembedded_page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    embedded: Some(false),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(unembedded_page.total, 1);
        assert_eq!(unembedded_page.items[0].title, "Unindexed");
    }

    #[tokio::test]
    async fn test_query_excludes_id() {
        let keep = listing(ListingKind::Lost, "Keep", 1);
        let drop = listing(ListingKind::Lost, "Drop", 2);
        let drop_id = drop.id;
        let store = MemoryStore::with_listings(vec![keep, drop]);

        let page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    exclude_id: Some(drop_id),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Keep");
    }

    #[tokio::test]
    async fn test_query_event_window() {
        let store = MemoryStore::with_listings(vec![
            listing(ListingKind::Lost, "Recent", 2),
            listing(ListingKind::Lost, "Stale", 40),
        ]);

        let page = query(
            &store,
            ListingQuery {
                filter: ListingFilter {
                    event_since: Some(Utc::now() - Duration::days(30)),
                    ..ListingFilter::default()
                },
                ..ListingQuery::default()
            },
        )
        .await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Recent");
    }

    #[tokio::test]
    async fn test_save_listing_upserts_by_id() {
        let store = MemoryStore::new();
        let mut l = listing(ListingKind::Found, "Keys", 1);
        store
            .save_listing(&l)
            .await
            .unwrap_or_else(|e| panic!("save failed: {e}"));

        l.title = "Keys with red lanyard".to_string();
        store
            .save_listing(&l)
            .await
            .unwrap_or_else(|e| panic!("save failed: {e}"));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Keys with red lanyard");
    }

    #[tokio::test]
    async fn test_save_claim_upserts_by_id() {
        let store = MemoryStore::new();
        let l = listing(ListingKind::Found, "Laptop", 1);
        let mut claim = Claim::new(l.id, "Jordan", "Has my initials on the lid");
        store
            .save_claim(&claim)
            .await
            .unwrap_or_else(|e| panic!("save failed: {e}"));

        claim.status = ClaimStatus::Accepted;
        claim.decided_at = Some(Utc::now());
        store
            .save_claim(&claim)
            .await
            .unwrap_or_else(|e| panic!("save failed: {e}"));

        let claims = store.claims_snapshot().await;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].status, ClaimStatus::Accepted);
    }
}
