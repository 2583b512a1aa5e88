//! OpenAI-compatible chat completions via `async-openai`.
//!
//! Works against any endpoint speaking the OpenAI chat API; the default
//! base URL targets Groq.

use super::{ChatMessage, LlmClient, LlmResponse, ToolCall, ToolDefinition};
use crate::error::{LlmError, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
};
use async_trait::async_trait;

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Connection settings for the chat model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key (`GROQ_API_KEY`).
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        }
    }
}

/// Chat client for OpenAI-compatible APIs.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ApiKeyMissing`] if no API key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::ApiKeyMissing {
                provider: config.base_url.clone(),
            })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model name used for requests.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let converted: ChatCompletionRequestMessage = match message {
        ChatMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        ChatMessage::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.as_str())
            .build()?
            .into(),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if !content.is_empty() {
                args.content(content.as_str());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()?.into()
        }
        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .content(content.as_str())
            .tool_call_id(call_id.as_str())
            .build()?
            .into(),
    };
    Ok(converted)
}

fn to_tool(tool: &ToolDefinition) -> Result<ChatCompletionTool> {
    let function = FunctionObjectArgs::default()
        .name(tool.name.as_str())
        .description(tool.description.as_str())
        .parameters(tool.parameters.clone())
        .build()?;
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(function)
        .build()?)
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(self.model.as_str())
            .messages(messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            request.tools(tools.iter().map(to_tool).collect::<Result<Vec<_>>>()?);
        }
        let request = request.build()?;

        tracing::debug!(model = %self.model, tools = tools.len(), "sending chat completion");
        let response = self.client.chat().create(request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(LlmResponse {
            content: choice.message.content,
            tool_calls,
            finish_reason: choice
                .finish_reason
                .and_then(|reason| serde_json::to_value(reason).ok())
                .and_then(|value| value.as_str().map(str::to_string)),
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_api_key() {
        let err = OpenAiClient::new(&LlmConfig::default()).unwrap_err();
        assert!(err.to_string().contains("API key missing"));

        let blank = LlmConfig {
            api_key: Some("  ".to_string()),
            ..LlmConfig::default()
        };
        assert!(OpenAiClient::new(&blank).is_err());
    }

    #[test]
    fn test_new_with_key() {
        let config = LlmConfig {
            api_key: Some("gsk_test".to_string()),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_convert_messages() {
        let call = ToolCall {
            id: "call_0".to_string(),
            name: "run_sql_query".to_string(),
            arguments: r#"{"query":"SELECT 1"}"#.to_string(),
        };
        let messages = [
            ChatMessage::system("sys"),
            ChatMessage::user("how many customers?"),
            ChatMessage::assistant("", vec![call]),
            ChatMessage::tool("call_0", "[]"),
        ];
        for message in &messages {
            assert!(to_request_message(message).is_ok());
        }

        let converted = to_request_message(&messages[3]).unwrap();
        assert!(matches!(converted, ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn test_convert_tool() {
        let tool = ToolDefinition {
            name: "query_vecdb".to_string(),
            description: "Retrieve schema documentation".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        };
        let converted = to_tool(&tool).unwrap();
        assert_eq!(converted.function.name, "query_vecdb");
    }
}
