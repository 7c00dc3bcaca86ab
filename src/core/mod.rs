//! Core domain types shared across the engine.
//!
//! These types live outside the storage and model layers so that the
//! store trait, the retrieval pipeline, and the CLI share one vocabulary
//! for catalog rows without depending on each other.

pub mod listing;
pub mod severity;
pub mod stats;

pub use listing::{Claim, ClaimStatus, Listing, ListingKind, ListingStatus};
pub use severity::Severity;
pub use stats::ListingStats;
