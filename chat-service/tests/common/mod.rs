//! Test helpers for chat-service integration tests.
//!
//! Builds the router over in-memory doubles so tests need no external service.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chat_service::{
    build_router,
    middleware::IDENTITY_HEADER,
    models::ConversationTurn,
    services::{
        providers::{
            FinishReason, GenerationParams, MockTextProvider, ProviderError, ProviderResponse,
            TextProvider,
        },
        HistoryLookup, HistoryStore, InMemoryHistoryStore,
    },
    AppState,
};
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub const TEST_USER_ID: &str = "u1";
pub const OTHER_USER_ID: &str = "u2";

/// One call observed by [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub message: String,
    pub system_prompt: Option<String>,
    pub params: GenerationParams,
}

/// Provider that replies with a fixed text and remembers every call.
pub struct RecordingProvider {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for RecordingProvider {
    async fn generate(
        &self,
        message: &str,
        system_prompt: Option<&str>,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            message: message.to_string(),
            system_prompt: system_prompt.map(str::to_string),
            params: *params,
        });

        Ok(ProviderResponse {
            text: self.reply.clone(),
            input_tokens: Some(3),
            output_tokens: Some(5),
            finish_reason: FinishReason::Complete,
        })
    }

    fn model_id(&self) -> &str {
        "recording"
    }
}

/// Provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl TextProvider for FailingProvider {
    async fn generate(
        &self,
        _message: &str,
        _system_prompt: Option<&str>,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::UnexpectedResponse(
            "Response contained no generated text".to_string(),
        ))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

/// Store that serves reads from memory but rejects every write.
#[derive(Default)]
pub struct FailingWritesStore {
    inner: InMemoryHistoryStore,
}

#[async_trait]
impl HistoryStore for FailingWritesStore {
    async fn put_turn(&self, _turn: &ConversationTurn) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "ProvisionedThroughputExceeded"
        )))
    }

    async fn query_turns(&self, lookup: &HistoryLookup) -> Result<Vec<ConversationTurn>, AppError> {
        self.inner.query_turns(lookup).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Store whose every operation fails.
pub struct UnavailableStore;

#[async_trait]
impl HistoryStore for UnavailableStore {
    async fn put_turn(&self, _turn: &ConversationTurn) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn query_turns(&self, _lookup: &HistoryLookup) -> Result<Vec<ConversationTurn>, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }
}

/// Router plus handles on the doubles behind it.
pub struct TestApp {
    pub router: Router,
    pub history: Arc<dyn HistoryStore>,
}

impl TestApp {
    /// In-memory store and mock provider.
    pub fn spawn() -> Self {
        Self::with(
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(MockTextProvider::new()),
        )
    }

    pub fn with(history: Arc<dyn HistoryStore>, text_provider: Arc<dyn TextProvider>) -> Self {
        let router = build_router(AppState::new(history.clone(), text_provider));
        Self { router, history }
    }

    /// Send a request and decode the JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).expect("Body is not JSON");
        (status, body)
    }

    /// `POST /chat` with a raw body as `user_id`.
    pub async fn post_chat_raw(
        &self,
        user_id: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header(IDENTITY_HEADER, user_id);
        }
        self.send(builder.body(body.into()).unwrap()).await
    }

    /// `POST /chat` with a JSON body as `user_id`.
    pub async fn post_chat(
        &self,
        user_id: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.post_chat_raw(user_id, body.to_string()).await
    }

    /// `GET /history?{query}` as `user_id`.
    pub async fn get_history(
        &self,
        user_id: Option<&str>,
        query: &str,
    ) -> (StatusCode, serde_json::Value) {
        let uri = if query.is_empty() {
            "/history".to_string()
        } else {
            format!("/history?{}", query)
        };
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(IDENTITY_HEADER, user_id);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Write a turn straight into the store.
    pub async fn seed_turn(&self, user_id: &str, conversation_id: &str, timestamp: i64, message: &str) {
        let turn = ConversationTurn {
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
            timestamp,
            user_message: message.to_string(),
            ai_response: format!("reply to {}", message),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        self.history.put_turn(&turn).await.expect("Failed to seed turn");
    }
}
