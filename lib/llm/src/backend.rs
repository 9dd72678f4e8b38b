//! Completion backend abstraction.
//!
//! The request and response shapes follow the OpenAI chat-completions wire
//! format, which most hosted and self-hosted providers accept.

use crate::error::LlmError;
use async_trait::async_trait;
use chatai_core::Message;
use serde::{Deserialize, Serialize};

/// A chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation to complete, oldest first.
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}

/// A chat-completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Provider-assigned completion id.
    #[serde(default)]
    pub id: Option<String>,
    /// Model that generated the response.
    #[serde(default)]
    pub model: Option<String>,
    /// Candidate replies; the relay only uses the first.
    pub choices: Vec<Choice>,
    /// Token usage statistics, when reported.
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Consumes the response, returning the first choice's message.
    #[must_use]
    pub fn into_first_message(self) -> Option<Message> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }
}

/// One candidate reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Trait for completion backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the request and returns the provider's response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unreachable, rejects the request,
    /// or answers with a body that cannot be decoded.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Returns the model requests are issued against.
    fn model(&self) -> &str;
}
