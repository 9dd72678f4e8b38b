//! Chat-completion primitives for the chatai relay.
//!
//! This crate provides:
//!
//! - **Backend**: the `CompletionBackend` abstraction over a chat-completion API
//! - **OpenAI**: an HTTP backend for OpenAI-compatible `/v1/chat/completions`
//! - **Relay**: prefixes a conversation with the system instruction and
//!   returns the first reply choice

pub mod backend;
pub mod error;
pub mod openai;
pub mod relay;

pub use backend::{Choice, CompletionBackend, CompletionRequest, CompletionResponse, TokenUsage};
pub use error::LlmError;
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use relay::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, Relay};
