//! Storage abstraction for the retrieval engine.
//!
//! The [`ListingStore`] trait defines every storage operation the engine
//! needs, enabling pluggable backends. All operations are async (via
//! `async-trait`); the bundled [`MemoryStore`](memory::MemoryStore)
//! returns immediately-ready futures and backs both tests and the CLI.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{Claim, Listing, ListingKind};
use crate::error::StoreError;

pub use memory::MemoryStore;

/// Sort order for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// Newest event first. The default for retrieval and reporting.
    #[default]
    EventDateDesc,
    /// Most recently created first. Used for moderation windows.
    CreatedAtDesc,
}

/// Filter predicates for listing queries. All fields are conjunctive;
/// `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Match only this listing kind.
    pub kind: Option<ListingKind>,
    /// Case-insensitive substring match over title, description,
    /// category, and location.
    pub text_contains: Option<String>,
    /// Event date at or after this instant.
    pub event_since: Option<DateTime<Utc>>,
    /// Event date strictly before this instant.
    pub event_before: Option<DateTime<Utc>>,
    /// Created at or after this instant.
    pub created_since: Option<DateTime<Utc>>,
    /// `Some(true)` keeps only listings with an embedding vector,
    /// `Some(false)` only those without one.
    pub embedded: Option<bool>,
    /// Exclude this listing id (used by similar-item lookups).
    pub exclude_id: Option<Uuid>,
}

/// A listing query: filter, order, and a pagination window.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Filter predicates.
    pub filter: ListingFilter,
    /// Sort order applied before pagination.
    pub order: ListingOrder,
    /// Rows to skip after ordering.
    pub skip: usize,
    /// Maximum rows to return. `None` returns everything after `skip`.
    pub take: Option<usize>,
}

/// One page of query results.
///
/// `total` counts every row matching the filter, not just the page,
/// so callers can derive page counts.
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// The rows in this page, in query order.
    pub items: Vec<Listing>,
    /// Total rows matching the filter.
    pub total: u64,
}

/// Abstract storage backend for listings and claims.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Retrieves a single listing by id.
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    /// Runs a filtered, ordered, paginated listing query.
    async fn query_listings(&self, query: &ListingQuery) -> Result<ListingPage, StoreError>;

    /// Inserts or updates a listing by id.
    async fn save_listing(&self, listing: &Listing) -> Result<(), StoreError>;

    /// Inserts or updates a claim by id.
    async fn save_claim(&self, claim: &Claim) -> Result<(), StoreError>;
}
