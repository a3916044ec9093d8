//! Chat handler.
//!
//! Forwards one user message to the text provider, records the exchange in
//! the history store, and returns the reply.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::CallerIdentity,
    models::{turn::iso_timestamp, ConversationTurn},
    services::{providers::GenerationParams, HistoryStore},
    startup::AppState,
};

/// Request to generate a reply.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message, 1 to 10000 characters.
    #[validate(length(min = 1, max = 10000, message = "Message must be 1-10000 characters"))]
    pub message: String,

    /// Existing conversation to continue. A new id is generated when absent.
    #[serde(default, alias = "conversation_id")]
    pub conversation_id: Option<String>,

    /// Optional system instruction, at most 5000 characters.
    #[serde(default, alias = "system_prompt")]
    #[validate(length(max = 5000, message = "System prompt must be at most 5000 characters"))]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    /// The supplied conversation id, or a fresh one.
    pub fn resolve_conversation_id(&self) -> String {
        self.conversation_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// The system instruction to send, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref().filter(|s| !s.is_empty())
    }
}

/// Generated reply.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub timestamp: String,
}

/// Handle `POST /chat`.
pub async fn chat(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request = parse_request(&body)?;

    let conversation_id = request.resolve_conversation_id();
    let system_prompt = request.system_prompt();

    tracing::info!(
        user_id = %caller.as_str(),
        conversation_id = %conversation_id,
        message_chars = request.message.chars().count(),
        has_system_prompt = system_prompt.is_some(),
        model = %state.text_provider.model_id(),
        "Processing chat request"
    );

    let generated = state
        .text_provider
        .generate(&request.message, system_prompt, &GenerationParams::CHAT)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Text generation failed");
            AppError::from(e)
        })?;

    tracing::info!(
        conversation_id = %conversation_id,
        input_tokens = ?generated.input_tokens,
        output_tokens = ?generated.output_tokens,
        finish_reason = ?generated.finish_reason,
        "Generated reply"
    );

    let turn = ConversationTurn::new(
        caller.0,
        conversation_id.clone(),
        request.message,
        generated.text.clone(),
    );
    save_to_history(state.history.as_ref(), &turn).await;

    Ok(Json(ChatResponse {
        response: generated.text,
        conversation_id,
        timestamp: iso_timestamp(Utc::now()),
    }))
}

/// Parse and validate a chat body. The `Content-Type` header is not consulted.
pub fn parse_request(body: &[u8]) -> Result<ChatRequest, AppError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidRequest(anyhow::anyhow!(e)))?;
    request.validate()?;
    Ok(request)
}

/// Record a turn without letting a store failure reach the caller.
async fn save_to_history(store: &dyn HistoryStore, turn: &ConversationTurn) {
    match store.put_turn(turn).await {
        Ok(()) => tracing::info!(
            conversation_id = %turn.conversation_id,
            "Saved conversation turn to history"
        ),
        Err(e) => tracing::error!(
            error = %e,
            conversation_id = %turn.conversation_id,
            "Failed to save conversation turn; returning reply anyway"
        ),
    }
}
