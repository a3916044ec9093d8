//! Conversation turn model: one user message and the generated reply.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat exchange.
///
/// Records are append-only: written once per successful chat request and
/// never updated or deleted by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// Caller identity as forwarded by the gateway.
    pub user_id: String,

    /// Conversation this turn belongs to.
    pub conversation_id: String,

    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// The caller's message.
    pub user_message: String,

    /// The generated reply.
    pub ai_response: String,

    /// Write time as an RFC 3339 string.
    pub created_at: String,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    pub fn new(
        user_id: String,
        conversation_id: String,
        user_message: String,
        ai_response: String,
    ) -> Self {
        Self::at(Utc::now(), user_id, conversation_id, user_message, ai_response)
    }

    /// Create a turn stamped with `now`.
    pub fn at(
        now: DateTime<Utc>,
        user_id: String,
        conversation_id: String,
        user_message: String,
        ai_response: String,
    ) -> Self {
        Self {
            user_id,
            conversation_id,
            timestamp: now.timestamp_millis(),
            user_message,
            ai_response,
            created_at: iso_timestamp(now),
        }
    }
}

/// Format a UTC instant the way every response and record in this service does.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
