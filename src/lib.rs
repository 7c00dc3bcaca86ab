//! Retrieval and analysis engine for campus lost-and-found catalogs.
//!
//! Rummage layers model-assisted workflows over a listing corpus:
//!
//! - **Grounded search**: keyword recall, embedding rerank, and an
//!   answer cited against the listings it was grounded on ([`search`],
//!   [`rerank`], [`citation`]).
//! - **Assistant**: a bounded two-turn tool-calling loop over read-only
//!   corpus tools ([`assist`], [`executor`], [`tool`]).
//! - **Batch analysis**: moderation sweeps, claim quality scoring, and
//!   FAQ synthesis under strict-JSON response contracts ([`analysis`]).
//!
//! Storage and model access sit behind traits ([`store::ListingStore`],
//! [`provider::ModelProvider`]) so the engine stays independent of any
//! particular database or vendor. [`store::MemoryStore`] and the OpenAI
//! backend in [`providers`] are the shipped implementations; the CLI in
//! [`cli`] is the crate's own thin consumer of the engine API.

pub mod analysis;
pub mod assist;
pub mod citation;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod executor;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod rerank;
pub mod search;
pub mod store;
pub mod tool;

pub use analysis::BatchAnalyzer;
pub use assist::Assistant;
pub use config::AiConfig;
pub use error::{EngineError, Result};
pub use search::RetrievalPipeline;
