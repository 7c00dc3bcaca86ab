//! `OpenAI` provider implementation using the `async-openai` crate.
//!
//! Supports any `OpenAI`-compatible API (`OpenAI`, Azure, local proxies)
//! via the base URL override in [`AiConfig`]. The underlying client is
//! only constructed when an API key is configured; calls made without
//! one fail with [`EngineError::Configuration`] so that offline engine
//! paths never pay a credential cost.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestToolMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequest, CreateEmbeddingRequestArgs, FinishReason,
    FunctionCall, FunctionObject, ResponseFormat,
};
use async_trait::async_trait;

use crate::config::AiConfig;
use crate::error::EngineError;
use crate::message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
use crate::provider::ModelProvider;
use crate::tool::ToolCall;

/// `OpenAI`-compatible model provider.
///
/// Wraps the `async-openai` client for chat completions and embeddings.
/// Compatible with any API that follows the `OpenAI` chat completion spec.
pub struct OpenAiProvider {
    client: Option<Client<OpenAIConfig>>,
    embed_model: String,
}

impl OpenAiProvider {
    /// Creates a new provider from engine configuration.
    ///
    /// A configuration without an API key still yields a provider; its
    /// calls fail with [`EngineError::Configuration`] until a key is set.
    #[must_use]
    pub fn new(config: &AiConfig) -> Self {
        let client = config.api_key.as_ref().map(|api_key| {
            let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
            if let Some(ref base_url) = config.base_url {
                openai_config = openai_config.with_api_base(base_url);
            }
            Client::with_config(openai_config)
        });

        Self {
            client,
            embed_model: config.embed_model.clone(),
        }
    }

    fn client(&self) -> Result<&Client<OpenAIConfig>, EngineError> {
        self.client.as_ref().ok_or_else(|| EngineError::Configuration {
            message: "no API key configured; set OPENAI_API_KEY".to_string(),
        })
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            Role::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                    msg.content.clone(),
                ),
                name: None,
            }),
            Role::Assistant => {
                let tool_calls = if msg.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        msg.tool_calls
                            .iter()
                            .map(|tc| ChatCompletionMessageToolCall {
                                id: tc.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                };

                let content = if msg.content.is_empty() {
                    None
                } else {
                    Some(
                        async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        ),
                    )
                };

                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content,
                    name: None,
                    tool_calls,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
            Role::Tool => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                content: async_openai::types::ChatCompletionRequestToolMessageContent::Text(
                    msg.content.clone(),
                ),
                tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
            }),
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let response_format = if request.json_mode {
            Some(ResponseFormat::JsonObject)
        } else {
            None
        };

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|td| ChatCompletionTool {
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionObject {
                            name: td.name.clone(),
                            description: Some(td.description.clone()),
                            parameters: Some(td.parameters.clone()),
                            strict: None,
                        },
                    })
                    .collect(),
            )
        };

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
            response_format,
            tools,
            ..Default::default()
        }
    }
}

/// Wire label for a finish reason, matching the values the chat
/// completion API emits.
const fn finish_reason_label(reason: FinishReason) -> &'static str {
    match reason {
        FinishReason::Stop => "stop",
        FinishReason::Length => "length",
        FinishReason::ToolCalls => "tool_calls",
        FinishReason::ContentFilter => "content_filter",
        FinishReason::FunctionCall => "function_call",
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &self.client.as_ref().map(|_| "<async-openai::Client>"))
            .field("embed_model", &self.embed_model)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, EngineError> {
        let client = self.client()?;
        let openai_request = Self::build_request(request);

        let response = client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| EngineError::Provider {
                message: e.to_string(),
                status: None,
            })?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .unwrap_or_default();

        let tool_calls = choice
            .and_then(|c| c.message.tool_calls.as_ref())
            .map(|tcs| {
                tcs.iter()
                    .map(|tc| ToolCall {
                        id: tc.id.clone(),
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let finish_reason = choice
            .and_then(|c| c.finish_reason)
            .map(|fr| finish_reason_label(fr).to_string());

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        Ok(ChatResponse {
            content,
            usage,
            tool_calls,
            finish_reason,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let client = self.client()?;

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embed_model)
            .input(text)
            .build()
            .map_err(|e| EngineError::Provider {
                message: e.to_string(),
                status: None,
            })?;

        let response = client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EngineError::Provider {
                message: e.to_string(),
                status: None,
            })?;

        let first = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Provider {
                message: "embedding response contained no data".to_string(),
                status: None,
            })?;

        Ok(first.embedding)
    }
}
