//! OpenAI-compatible HTTP completion backend.

use crate::backend::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "openai";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Organization id, sent as `OpenAI-Organization` when present.
    pub organization: Option<String>,
    /// Base URL without the `/v1/...` path, e.g. `https://api.openai.com`.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    /// Creates a configuration for the public OpenAI API.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            base_url: "https://api.openai.com".to_string(),
            model: model.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("organization", &self.organization)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Completion backend speaking the OpenAI chat-completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiBackend {
    /// Builds the backend and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidConfig` if the API key is empty or the
    /// HTTP client cannot be constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "API key is empty".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LlmError::InvalidConfig {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint: config.completions_url(),
            config,
        })
    }

    /// Returns the full completions URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut http_request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(request);

        if let Some(organization) = &self.config.organization
            && !organization.is_empty()
        {
            http_request = http_request.header("OpenAI-Organization", organization);
        }

        let response = http_request.send().await.map_err(|e| {
            warn!(error = %e, endpoint = %self.endpoint, "Completion request did not reach provider");
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::ProviderUnavailable {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::ResponseParseFailed {
                    reason: e.to_string(),
                }
            }
        })?;

        debug!(
            choices = completion.choices.len(),
            total_tokens = completion.usage.as_ref().map(|u| u.total_tokens),
            "Completion received"
        );

        Ok(completion)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
