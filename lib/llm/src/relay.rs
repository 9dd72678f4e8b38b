//! The relay operation: prefix a client conversation with the system
//! instruction, forward it, and hand back the first reply.

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::error::LlmError;
use chatai_core::{Message, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// System instruction prepended to every relayed conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Answer the below queries.";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Forwards client conversations to a completion backend.
///
/// The client never holds the system instruction; the relay inserts exactly
/// one system message ahead of whatever the client sent.
#[derive(Clone)]
pub struct Relay {
    backend: Arc<dyn CompletionBackend>,
    system_prompt: String,
}

impl Relay {
    /// Creates a relay using [`DEFAULT_SYSTEM_PROMPT`].
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replaces the system instruction.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Builds the outbound request: the system message, then `chats` in order.
    #[must_use]
    pub fn build_request(&self, chats: Vec<Message>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(chats.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(chats);
        CompletionRequest::new(self.backend.model(), messages)
    }

    /// Relays `chats` and returns the first reply choice's message.
    ///
    /// # Errors
    ///
    /// Any backend failure is returned as-is; a response without choices
    /// yields `LlmError::EmptyResponse`. Nothing is retried.
    #[instrument(skip(self, chats), fields(chat_count = chats.len(), model = %self.backend.model()))]
    pub async fn forward(&self, chats: Vec<Message>) -> Result<Message, LlmError> {
        let request = self.build_request(chats);
        let response = self.backend.complete(&request).await?;
        let reply = response
            .into_first_message()
            .ok_or(LlmError::EmptyResponse)?;

        debug!(role = %reply.role(), reply_len = reply.content().len(), "Relay reply ready");
        Ok(reply)
    }
}
