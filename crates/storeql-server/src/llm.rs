//! OpenAI-backed SQL generation.
//!
//! The generator gets exactly one shot per request: a single user message
//! carrying the composed prompt, temperature pinned to zero, and whatever
//! text comes back goes to the sanitizer as-is. No retries, no conversation
//! state.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Request(String),

    #[error("No response from OpenAI")]
    EmptyResponse,
}

/// Turns a composed prompt into candidate SQL text. Implemented by the
/// OpenAI client in production and by canned stubs in tests.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl SqlGenerator for OpenAiGenerator {
    async fn generate_sql(&self, prompt: &str) -> Result<String, GenerationError> {
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .ok_or(GenerationError::EmptyResponse)?;

        tracing::debug!(chars = content.len(), "generation response received");
        Ok(content.clone())
    }
}
