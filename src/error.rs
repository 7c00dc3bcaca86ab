//! Error types for the retrieval engine.
//!
//! All fallible engine operations return [`EngineError`]. Storage
//! backends report failures through [`StoreError`], which converts
//! into [`EngineError::Store`] at the engine boundary.

use uuid::Uuid;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine is missing configuration required for this call,
    /// such as an API key for a model-backed operation.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is missing or malformed.
        message: String,
    },

    /// The model provider returned an error or was unreachable.
    #[error("provider request failed: {message}")]
    Provider {
        /// Provider-reported failure description.
        message: String,
        /// HTTP status code, if one was received.
        status: Option<u16>,
    },

    /// The model's response could not be parsed into the expected shape.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// Description of the parse failure.
        message: String,
        /// The raw content that failed to parse (may be truncated).
        content: String,
    },

    /// A listing referenced by id does not exist.
    #[error("listing {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// Caller-supplied input was rejected before any work was done.
    #[error("invalid input: {message}")]
    Validation {
        /// Why the input was rejected.
        message: String,
    },

    /// A corpus tool failed while handling a model tool call.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the tool that failed.
        name: String,
        /// Failure description.
        message: String,
    },

    /// The storage backend reported a failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors produced by listing storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing medium could not be read or written.
    #[error("storage I/O failed: {message}")]
    Io {
        /// Underlying failure description.
        message: String,
    },

    /// Stored data could not be decoded.
    #[error("corrupt stored data: {message}")]
    Corrupt {
        /// What failed to decode.
        message: String,
    },
}
