//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Corpus file consulted when `--corpus` is not given.
pub const DEFAULT_CORPUS_PATH: &str = "listings.json";

/// Rummage: retrieval and analysis engine for campus lost-and-found data.
///
/// Loads a JSON corpus of listings and runs one engine operation per
/// invocation: grounded search, similar-item lookup, the tool-calling
/// assistant, moderation sweeps, claim quality checks, FAQ synthesis,
/// and embedding maintenance.
#[derive(Parser, Debug)]
#[command(name = "rummage")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON corpus file (an array of listings).
    ///
    /// Defaults to `listings.json` in the current directory.
    #[arg(short, long, env = "RUMMAGE_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Enable verbose diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search listings and answer from them, with citations.
    #[command(after_help = r#"Examples:
  rummage search "blue backpack"                   # Search the default corpus
  rummage --corpus dump.json search "umbrella"     # Search a specific corpus
  rummage --json search "laptop" | jq '.cited_ids'
"#)]
    Search {
        /// Search query text.
        query: String,
    },

    /// List the listings most similar to an existing listing.
    #[command(after_help = r#"Examples:
  rummage similar 5a3e...-d2           # Top 6 similar listings
  rummage similar 5a3e...-d2 -k 3      # Top 3
  rummage --json similar 5a3e...-d2 | jq '.[].score'
"#)]
    Similar {
        /// Listing id to compare against.
        id: Uuid,

        /// Maximum number of similar listings to return.
        #[arg(short = 'k', long, default_value = "6")]
        top_k: usize,
    },

    /// Ask the listings assistant a free-form question.
    ///
    /// The assistant may call read-only corpus tools (search, lookup,
    /// monthly report, trends) before answering.
    #[command(after_help = r#"Examples:
  rummage assist "Was a silver laptop found last week?"
  rummage assist "How many items were lost in March 2026?"
  rummage --json assist "what's trending?" | jq '.tool_calls'
"#)]
    Assist {
        /// The question or request.
        message: String,
    },

    /// Sweep recently created listings for suspicious content.
    #[command(after_help = r#"Examples:
  rummage moderate                                 # Last 7 days, up to 200 listings
  rummage moderate --since-days 30
  rummage --json moderate | jq '.flagged[].listing_id'
"#)]
    Moderate {
        /// Look-back window in days over listing creation time.
        #[arg(long, default_value = "7")]
        since_days: i64,

        /// Maximum number of listings to analyze.
        #[arg(long, default_value = "200")]
        max_listings: usize,
    },

    /// Score a claim message against a listing.
    ClaimCheck {
        /// Listing id the claim refers to.
        id: Uuid,

        /// The claim message to evaluate.
        message: String,
    },

    /// Generate a data-grounded FAQ from recent listings.
    #[command(after_help = r#"Examples:
  rummage faq                  # Last 30 days
  rummage faq --days 90
  rummage --json faq | jq '.stats'
"#)]
    Faq {
        /// Look-back window in days over listing event dates.
        #[arg(long, default_value = "30")]
        days: i64,
    },

    /// Embed listings missing vectors and rewrite the corpus file.
    Reindex,
}

impl Cli {
    /// Returns the corpus path, using the default if not specified.
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        self.corpus
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH))
    }
}
