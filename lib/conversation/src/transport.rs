//! Delivery of the client conversation to the relay.

use crate::error::TransportError;
use async_trait::async_trait;
use chatai_core::{Message, RelayRequest, RelayResponse};
use std::time::Duration;
use tracing::{debug, instrument};

/// Sends a conversation to the relay and returns its reply.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Posts `chats` and waits for the reply message.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay is unreachable, answers with a failure
    /// status, or the reply cannot be decoded.
    async fn send(&self, chats: &[Message]) -> Result<Message, TransportError>;
}

/// HTTP transport posting `{ chats }` as JSON.
#[derive(Debug, Clone)]
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayTransport {
    /// Creates a transport for the relay at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Self::build(endpoint.into(), None)
    }

    /// Creates a transport that gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        Self::build(endpoint.into(), Some(timeout))
    }

    fn build(endpoint: String, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    #[instrument(skip(self, chats), fields(endpoint = %self.endpoint, chat_count = chats.len()))]
    async fn send(&self, chats: &[Message]) -> Result<Message, TransportError> {
        let body = RelayRequest {
            chats: chats.to_vec(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        endpoint: self.endpoint.clone(),
                    }
                } else {
                    TransportError::RequestFailed {
                        endpoint: self.endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: RelayResponse =
            response
                .json()
                .await
                .map_err(|e| TransportError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        debug!(role = %reply.output.role(), "Relay replied");
        Ok(reply.output)
    }
}
