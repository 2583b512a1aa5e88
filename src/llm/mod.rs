//! Chat completion clients.
//!
//! The agent and the formatter talk to the model through [`LlmClient`], so
//! the hosted provider can be swapped for a scripted one in tests.

mod openai;
mod types;

pub use openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig, OpenAiClient};
pub use types::{ChatMessage, LlmResponse, ToolCall, ToolDefinition};

use crate::error::Result;
use async_trait::async_trait;

/// A chat completion backend with tool calling.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the conversation and advertised tools, returning one model turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is unusable.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;

    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Single-prompt completion without tools; returns the text content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the model returns no text.
    async fn prompt(&self, prompt: &str) -> Result<String> {
        let response = self.complete(&[ChatMessage::user(prompt)], &[]).await?;
        response
            .content
            .ok_or_else(|| crate::error::LlmError::EmptyResponse.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl LlmClient for Echo {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
        ) -> Result<LlmResponse> {
            Ok(LlmResponse::text(
                messages.last().map(ChatMessage::content).unwrap_or_default(),
            ))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct Silent;

    #[async_trait]
    impl LlmClient for Silent {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
        ) -> Result<LlmResponse> {
            Ok(LlmResponse::default())
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn test_prompt_default_impl() {
        assert_eq!(Echo.prompt("hello").await.unwrap(), "hello");
        assert_eq!(Echo.name(), "echo");
    }

    #[tokio::test]
    async fn test_prompt_empty_response() {
        assert!(Silent.prompt("hello").await.is_err());
    }
}
