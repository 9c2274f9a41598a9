//! HTTP front door for the agent.
//!
//! `POST /api/agent` takes the caller's full history and returns the final
//! answer. The service keeps no session state; callers resend history on
//! every request.

use crate::agent::AgentLoop;
use crate::traits::ChatMessage;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
}

pub fn build_router(agent: Arc<AgentLoop>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/agent", post(agent_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(agent)
}

pub async fn serve(agent: Arc<AgentLoop>, address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Agent API listening on http://{}", address);

    axum::serve(listener, build_router(agent))
        .await
        .context("Agent API server stopped unexpectedly")
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn agent_handler(
    State(agent): State<Arc<AgentLoop>>,
    Json(request): Json<AgentRequest>,
) -> Json<AgentResponse> {
    let response = agent.process_with_history(request.messages).await;
    Json(AgentResponse { response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ContextBuilder;
    use crate::directive::Argument;
    use crate::traits::{ChatRequest, ChatResponse, Dispatch, Provider, Role, ToolGateway};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            let last_user = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone());
            Ok(ChatResponse {
                text: last_user.map(|c| format!("echo: {}", c)),
            })
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolGateway for NoTools {
        fn tool_names(&self) -> Vec<String> {
            Vec::new()
        }

        async fn invoke(&self, name: &str, _argument: &Argument) -> Dispatch {
            Dispatch::completed(200, name)
        }
    }

    fn app() -> Router {
        let agent = AgentLoop::new(
            Arc::new(EchoProvider),
            Arc::new(NoTools),
            ContextBuilder::new(Vec::new()),
        );
        build_router(Arc::new(agent))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn agent_endpoint_answers_with_final_text() {
        let body = serde_json::json!({
            "messages": [
                { "role": "user", "content": "first" },
                { "role": "assistant", "content": "echo: first" },
                { "role": "user", "content": "second" }
            ]
        });
        let req = Request::builder()
            .method("POST")
            .uri("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: AgentResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.response, "echo: second");
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let body = serde_json::json!({
            "messages": [{ "role": "tool", "content": "x" }]
        });
        let req = Request::builder()
            .method("POST")
            .uri("/api/agent")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
