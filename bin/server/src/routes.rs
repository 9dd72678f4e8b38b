//! Router setup and handlers.
//!
//! The relay is called from browsers on other origins, so CORS is open to
//! any origin. There is no authentication.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use chatai_core::{RelayRequest, RelayRequestId, RelayResponse};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RelayError;
use crate::state::AppState;

/// Creates the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(relay_chats))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `POST /`: relays `{ chats }` and answers `{ output }`.
async fn relay_chats(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, RelayError> {
    let Json(request) = payload.map_err(|rejection| RelayError::BadRequest {
        reason: rejection.body_text(),
    })?;

    let request_id = RelayRequestId::new();
    info!(
        %request_id,
        chat_count = request.chats.len(),
        model = %state.relay.model(),
        "Relaying conversation"
    );

    let output = state
        .relay
        .forward(request.chats)
        .await
        .map_err(|report| RelayError::Upstream {
            request_id,
            details: report.to_string(),
        })?;

    Ok(Json(RelayResponse { output }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chatai_core::{Message, MessageRole};
    use chatai_llm::{
        Choice, CompletionBackend, CompletionRequest, CompletionResponse, LlmError, Relay,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    struct MockBackend {
        outcome: Result<Vec<Message>, LlmError>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockBackend {
        fn replying(content: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(vec![Message::assistant(content)]),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: LlmError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(error),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().expect("lock").push(request.clone());
            let messages = self.outcome.clone()?;
            Ok(CompletionResponse {
                id: Some("chatcmpl-test".to_string()),
                model: Some(request.model.clone()),
                choices: messages
                    .into_iter()
                    .enumerate()
                    .map(|(index, message)| Choice {
                        index: index as u32,
                        message,
                        finish_reason: Some("stop".to_string()),
                    })
                    .collect(),
                usage: None,
            })
        }

        fn model(&self) -> &str {
            "gpt-3.5-turbo"
        }
    }

    fn app(backend: Arc<MockBackend>) -> Router {
        create_router(AppState::new(Relay::new(backend)))
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn relays_conversation_with_system_prefix() {
        let backend = MockBackend::replying("Paris.");
        let body = json!({
            "chats": [
                {"role": "user", "content": "Capital of France?"}
            ]
        });

        let response = app(backend.clone())
            .oneshot(post_json(body.to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"output": {"role": "assistant", "content": "Paris."}})
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
        assert_eq!(
            requests[0].messages,
            vec![
                Message::system("Answer the below queries."),
                Message::user("Capital of France?")
            ]
        );
    }

    #[tokio::test]
    async fn first_choice_wins() {
        let backend = Arc::new(MockBackend {
            outcome: Ok(vec![Message::assistant("first"), Message::assistant("second")]),
            requests: Mutex::new(Vec::new()),
        });

        let response = app(backend)
            .oneshot(post_json(json!({"chats": []}).to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["output"]["content"], "first");
    }

    #[tokio::test]
    async fn empty_chats_forward_only_the_system_message() {
        let backend = MockBackend::replying("Ask away.");
        let response = app(backend.clone())
            .oneshot(post_json(json!({"chats": []}).to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = backend.requests();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role(), MessageRole::System);
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected_without_upstream_call() {
        let backend = MockBackend::replying("unused");
        for body in ["", "not json", r#"{"messages": []}"#, r#"{"chats": "hi"}"#] {
            let response = app(backend.clone())
                .oneshot(post_json(body))
                .await
                .expect("response");

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
            let json = body_json(response).await;
            assert!(json["error"].is_string(), "body: {body:?}");
        }
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let backend = MockBackend::replying("unused");
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(json!({"chats": []}).to_string()))
            .expect("request");

        let response = app(backend).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failure_is_a_bad_gateway() {
        let backend = MockBackend::failing(LlmError::RequestFailed {
            status: 429,
            body: "quota exceeded".to_string(),
        });

        let response = app(backend.clone())
            .oneshot(post_json(
                json!({"chats": [{"role": "user", "content": "hi"}]}).to_string(),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "upstream completion service failed");
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn zero_choices_is_a_bad_gateway() {
        let backend = Arc::new(MockBackend {
            outcome: Ok(Vec::new()),
            requests: Mutex::new(Vec::new()),
        });

        let response = app(backend)
            .oneshot(post_json(json!({"chats": []}).to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(MockBackend::replying("unused"))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = app(MockBackend::replying("hi"))
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
