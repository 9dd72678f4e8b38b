//! Error types for the conversation crate.
//!
//! - `SessionError`: Rejected session state transitions
//! - `TransportError`: Failures delivering a conversation to the relay
//! - `SpeechError`: Failures from platform speech services

use crate::session::SessionState;
use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Invalid session state transition.
    InvalidStateTransition { from: SessionState, to: SessionState },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to } => {
                write!(f, "invalid state transition from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from relay delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The relay could not be reached.
    RequestFailed { endpoint: String, reason: String },
    /// The relay answered with a non-success status.
    Status { status: u16, body: String },
    /// The relay's body was not a `{ output }` reply.
    ResponseParseFailed { reason: String },
    /// Timed out waiting for the relay.
    Timeout { endpoint: String },
    /// Invalid transport configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { endpoint, reason } => {
                write!(f, "failed to reach relay '{endpoint}': {reason}")
            }
            Self::Status { status, body } => {
                write!(f, "relay returned HTTP {status}: {body}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse relay reply: {reason}")
            }
            Self::Timeout { endpoint } => write!(f, "request to '{endpoint}' timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid relay transport configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors from speech recognition or synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// Recognition is not available on this platform.
    RecognitionUnavailable { reason: String },
    /// The synthesizer failed to play an utterance.
    SynthesisFailed { reason: String },
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecognitionUnavailable { reason } => {
                write!(f, "speech recognition unavailable: {reason}")
            }
            Self::SynthesisFailed { reason } => {
                write!(f, "speech synthesis failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SpeechError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::InvalidStateTransition {
            from: SessionState::AwaitingReply,
            to: SessionState::Sending,
        };
        assert_eq!(
            err.to_string(),
            "invalid state transition from awaiting_reply to sending"
        );
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::Status {
            status: 502,
            body: "upstream failed".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("upstream failed"));
    }

    #[test]
    fn speech_error_display() {
        let err = SpeechError::RecognitionUnavailable {
            reason: "no microphone".to_string(),
        };
        assert!(err.to_string().contains("no microphone"));
    }
}
