//! Error types for the llm crate.
//!
//! `LlmError` describes what went wrong talking to the completion service.
//! The relay returns it wrapped in a rootcause `Report`.

use std::fmt;

/// Errors from completion backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The provider could not be reached.
    ProviderUnavailable { provider: String, reason: String },
    /// The provider answered with a non-success status (auth, quota, ...).
    RequestFailed { status: u16, body: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// The provider returned no reply choices.
    EmptyResponse,
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { status, body } => {
                write!(f, "LLM request failed with HTTP {status}: {body}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::EmptyResponse => write!(f, "LLM response contained no choices"),
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_unavailable_display() {
        let err = LlmError::ProviderUnavailable {
            provider: "openai".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("openai"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn request_failed_display_includes_status() {
        let err = LlmError::RequestFailed {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));
    }

    #[test]
    fn rate_limited_display() {
        let with_hint = LlmError::RateLimited {
            retry_after_secs: Some(20),
        };
        assert_eq!(with_hint.to_string(), "rate limited, retry after 20s");
        let without = LlmError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(without.to_string(), "rate limited");
    }
}
