//! Listing and claim domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a listing reports a lost item or a found item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    /// The owner lost the item and is looking for it.
    Lost,
    /// Someone found the item and posted it for pickup.
    Found,
}

impl ListingKind {
    /// Parses a kind string (case-insensitive).
    ///
    /// Returns `None` for unrecognized values so callers can decide
    /// whether a bad filter matches nothing or fails the request.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lost" => Some(Self::Lost),
            "found" => Some(Self::Found),
            _ => None,
        }
    }

    /// Returns the display form used in prompt text and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "Lost",
            Self::Found => "Found",
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible and open for claims.
    #[default]
    Open,
    /// Resolved by an accepted claim.
    Claimed,
    /// Closed by the owner.
    Closed,
    /// Hidden by moderation.
    Hidden,
}

impl ListingStatus {
    /// Returns the display form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Claimed => "Claimed",
            Self::Closed => "Closed",
            Self::Hidden => "Hidden",
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Awaiting a decision from the listing owner.
    #[default]
    Pending,
    /// Accepted; the listing moves to [`ListingStatus::Claimed`].
    Accepted,
    /// Rejected.
    Rejected,
}

impl ClaimStatus {
    /// Returns the display form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lost-or-found catalog row.
///
/// Optional AI metadata (`ai_tags`, `ai_summary`, `normalized_location`)
/// and the embedding vector are written back by indexing workflows and
/// absent on newly created listings, so they all deserialize leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing id.
    pub id: Uuid,
    /// Name of the person who posted the listing.
    pub owner_name: String,
    /// Lost or found.
    pub kind: ListingKind,
    /// Short item title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Item category (e.g. "Electronics").
    pub category: String,
    /// Where the item was lost or found.
    pub location: String,
    /// When the loss or find happened.
    pub event_date: DateTime<Utc>,
    /// Optional photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ListingStatus,
    /// Embedding vector for semantic rerank. `None` until indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Comma-separated tags produced by enrichment workflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_tags: Option<String>,
    /// One-line summary produced by enrichment workflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    /// Canonical location name produced by enrichment workflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_location: Option<String>,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Creates a new open listing with a fresh id and current timestamps.
    #[must_use]
    pub fn new(
        owner_name: impl Into<String>,
        kind: ListingKind,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
        event_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_name: owner_name.into(),
            kind,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            location: location.into(),
            event_date,
            photo_url: None,
            status: ListingStatus::Open,
            embedding: None,
            ai_tags: None,
            ai_summary: None,
            normalized_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Composes the text that gets embedded for this listing.
    ///
    /// The same composition is used when indexing and when synthesizing an
    /// on-the-fly vector for similar-item lookups, so the two stay comparable.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.kind.as_str(),
            self.title,
            self.description,
            self.category,
            self.location
        )
    }

    /// Case-insensitive substring match over title, description, category,
    /// and location. `needle_lower` must already be lowercased.
    #[must_use]
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
            || self.location.to_lowercase().contains(needle_lower)
    }
}

/// A claim filed against a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique claim id.
    pub id: Uuid,
    /// The listing being claimed.
    pub listing_id: Uuid,
    /// Name of the claimant.
    pub requester_name: String,
    /// The claimant's ownership argument.
    pub message: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ClaimStatus,
    /// Creation timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// When the claim was accepted or rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Creates a new pending claim against a listing.
    #[must_use]
    pub fn new(
        listing_id: Uuid,
        requester_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            requester_name: requester_name.into(),
            message: message.into(),
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        }
    }
}
