//! History handler.
//!
//! Translates query parameters into a store lookup scoped to the caller.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::{
    middleware::CallerIdentity, models::ConversationTurn, services::HistoryLookup,
    startup::AppState,
};

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const MIN_HISTORY_LIMIT: u32 = 1;
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Query parameters for `GET /history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Restrict results to one conversation.
    pub conversation_id: Option<String>,
    /// Page size; kept raw so clamping and rejection follow our own rules.
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ConversationTurn>,
    pub count: usize,
}

/// Parse a `limit` parameter and clamp it into
/// `[MIN_HISTORY_LIMIT, MAX_HISTORY_LIMIT]`.
///
/// Any integer is accepted, including ones that overflow `i64`. Anything else
/// is rejected.
pub fn parse_limit(raw: Option<&str>) -> Result<u32, AppError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_HISTORY_LIMIT);
    };
    let trimmed = raw.trim();

    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) if is_integer_literal(trimmed) => {
            if trimmed.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(e) => {
            return Err(AppError::InvalidQuery(anyhow::anyhow!(
                "limit '{}' is not an integer: {}",
                raw,
                e
            )))
        }
    };

    let clamped = value.clamp(i64::from(MIN_HISTORY_LIMIT), i64::from(MAX_HISTORY_LIMIT));
    Ok(clamped as u32)
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Handle `GET /history`.
pub async fn get_history(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::InvalidQuery(anyhow::anyhow!(e.body_text())))?;

    let limit = parse_limit(query.limit.as_deref())?;
    let conversation_id = query.conversation_id.filter(|id| !id.is_empty());

    tracing::info!(
        user_id = %caller.as_str(),
        conversation_id = ?conversation_id,
        limit,
        "Fetching history"
    );

    let lookup = HistoryLookup {
        user_id: caller.0,
        conversation_id,
        limit,
    };
    let history = state.history.query_turns(&lookup).await?;

    Ok(Json(HistoryResponse {
        count: history.len(),
        history,
    }))
}
