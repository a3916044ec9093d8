//! In-process history store for local development and tests.

use super::database::{HistoryLookup, HistoryStore};
use crate::models::ConversationTurn;
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// History store holding turns in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    turns: RwLock<Vec<ConversationTurn>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), AppError> {
        self.turns.write().await.push(turn.clone());
        Ok(())
    }

    async fn query_turns(&self, lookup: &HistoryLookup) -> Result<Vec<ConversationTurn>, AppError> {
        let turns = self.turns.read().await;

        // Newest insert first so equal timestamps also come back most-recent-first.
        let mut matching: Vec<ConversationTurn> = turns
            .iter()
            .rev()
            .filter(|turn| turn.user_id == lookup.user_id)
            .filter(|turn| {
                lookup
                    .conversation_id
                    .as_deref()
                    .map_or(true, |id| turn.conversation_id == id)
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(lookup.limit as usize);

        Ok(matching)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
