//! Concrete [`ModelProvider`](crate::provider::ModelProvider) backends.

pub mod openai;

pub use openai::OpenAiProvider;
