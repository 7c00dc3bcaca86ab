//! Two-turn tool-calling conversation over the listing corpus.
//!
//! Drives one bounded round-trip: the user message goes out with the
//! full tool catalog; if the model requests tools, each call is executed
//! in order and the conversation is resent once with tool-use disabled
//! to produce the final answer. The model never gets a third turn, so a
//! conversation costs at most two completions.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::citation::extract_citations;
use crate::config::AiConfig;
use crate::error::{EngineError, Result};
use crate::executor::ToolExecutor;
use crate::message::{
    ChatMessage, ChatRequest, ModelTurn, assistant_tool_calls_message, tool_message, user_message,
};
use crate::provider::ModelProvider;
use crate::store::{ListingQuery, ListingStore};
use crate::tool::ToolSet;

/// One executed tool call, kept for the response log.
///
/// The log is part of the assist contract: callers see exactly which
/// corpus queries grounded the answer, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    /// Tool name.
    pub tool: String,
    /// Parsed tool arguments.
    pub args: Value,
}

/// Outcome of an assistant conversation.
#[derive(Debug, Clone, Serialize)]
pub struct AssistOutcome {
    /// Final answer text.
    pub answer: String,
    /// Ordered log of executed tool calls. Empty when the model answered
    /// without tools.
    pub tool_calls: Vec<ToolInvocation>,
    /// Corpus ids literally present in the answer text.
    pub cited_ids: Vec<Uuid>,
}

/// Tool-calling assistant over the listing corpus.
pub struct Assistant {
    store: Arc<dyn ListingStore>,
    provider: Arc<dyn ModelProvider>,
    config: AiConfig,
}

impl Assistant {
    /// Creates an assistant over the given store and provider.
    #[must_use]
    pub fn new(
        store: Arc<dyn ListingStore>,
        provider: Arc<dyn ModelProvider>,
        config: AiConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Answers a free-form question, calling corpus tools when the model
    /// asks for them.
    ///
    /// Turn 1 sends the bare user message with all four corpus tools
    /// attached. A direct text reply is terminal. Otherwise every
    /// requested call executes in the model's order, the results are
    /// appended as tool messages, and turn 2 resends the conversation
    /// with tools disabled. Either way the answer text is scanned
    /// against every corpus id for citations.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank message before
    /// any external call. An unknown tool name or a tool failure is
    /// fatal to the conversation and surfaces as
    /// [`EngineError::ToolExecution`]. Provider failures propagate.
    pub async fn assist(&self, message: &str) -> Result<AssistOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(EngineError::Validation {
                message: "assist message must not be empty".to_string(),
            });
        }

        let mut messages = vec![user_message(message)];
        let first = self
            .provider
            .chat(&self.request(&messages, &ToolSet::assistant_tools()))
            .await?;

        let calls = match first.into_turn() {
            ModelTurn::FinalAnswer(answer) => {
                // Terminal single-turn state: no tools ran, so the log
                // stays empty, but the text is still citation-scanned.
                debug!("assistant answered without tools");
                let cited_ids = self.scan_corpus_citations(&answer).await?;
                return Ok(AssistOutcome {
                    answer,
                    tool_calls: Vec::new(),
                    cited_ids,
                });
            }
            ModelTurn::ToolRequest(calls) => calls,
        };

        debug!(tool_count = calls.len(), "executing requested tool calls");
        messages.push(assistant_tool_calls_message(calls.clone()));

        let executor = ToolExecutor::new(self.store.as_ref());
        let mut log = Vec::with_capacity(calls.len());
        for call in &calls {
            let result = executor.execute(call).await?;
            debug!(tool = %call.name, call_id = %call.id, "tool execution complete");
            messages.push(tool_message(&result.tool_call_id, &result.content));
            log.push(ToolInvocation {
                tool: call.name.clone(),
                args: serde_json::from_str(&call.arguments).unwrap_or(Value::Null),
            });
        }

        let second = self
            .provider
            .chat(&self.request(&messages, &ToolSet::none()))
            .await?;
        let answer = second.content;

        let cited_ids = self.scan_corpus_citations(&answer).await?;
        Ok(AssistOutcome {
            answer,
            tool_calls: log,
            cited_ids,
        })
    }

    /// Builds a completion request for the current conversation state.
    fn request(&self, messages: &[ChatMessage], tools: &ToolSet) -> ChatRequest {
        ChatRequest {
            model: self.config.chat_model.clone(),
            messages: messages.to_vec(),
            temperature: None,
            max_tokens: None,
            json_mode: false,
            tools: tools.definitions().to_vec(),
        }
    }

    /// Scans an answer against every id in the corpus.
    async fn scan_corpus_citations(&self, answer: &str) -> Result<Vec<Uuid>> {
        let page = self.store.query_listings(&ListingQuery::default()).await?;
        Ok(extract_citations(answer, page.items.iter().map(|l| l.id)))
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
