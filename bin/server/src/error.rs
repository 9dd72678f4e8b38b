//! Relay error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatai_core::{ErrorBody, RelayRequestId};
use std::fmt;

/// Errors returned by the relay endpoint.
#[derive(Debug)]
pub enum RelayError {
    /// The request body was absent or not a `{ chats }` object.
    BadRequest { reason: String },
    /// The upstream completion call failed.
    Upstream {
        request_id: RelayRequestId,
        details: String,
    },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { reason } => write!(f, "bad relay request: {reason}"),
            Self::Upstream {
                request_id,
                details,
            } => {
                write!(f, "upstream failure for {request_id}: {details}")
            }
        }
    }
}

impl std::error::Error for RelayError {}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { reason } => {
                tracing::debug!(%reason, "Rejected relay request");
                (StatusCode::BAD_REQUEST, reason)
            }
            Self::Upstream {
                request_id,
                details,
            } => {
                tracing::error!(%request_id, %details, "Completion request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream completion service failed".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
