//! Conversation history persistence.
//!
//! Turns are keyed by `userId`, narrowed by `conversationId`, and ordered by
//! `timestamp`. The store is append-only from this service's point of view.

use crate::config::MongoConfig;
use crate::models::ConversationTurn;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{ClientOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, IndexModel,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

/// Lookup of a caller's turns, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLookup {
    pub user_id: String,
    /// Restrict to one conversation when set.
    pub conversation_id: Option<String>,
    /// Maximum number of turns to return.
    pub limit: u32,
}

/// Storage backend for conversation turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one turn.
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), AppError>;

    /// Return at most `lookup.limit` turns belonging to `lookup.user_id`,
    /// ordered by `timestamp` descending.
    async fn query_turns(&self, lookup: &HistoryLookup) -> Result<Vec<ConversationTurn>, AppError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}

/// MongoDB-backed history store.
#[derive(Clone)]
pub struct MongoHistoryStore {
    client: MongoClient,
    turns: Collection<ConversationTurn>,
}

impl MongoHistoryStore {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut client_options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::DatabaseError(e.into())
            })?;
        client_options.app_name = Some("chat-service".to_string());

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(e.into())
        })?;

        let turns = client
            .database(&config.database)
            .collection(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB history store ready"
        );

        Ok(Self { client, turns })
    }

    /// Create the indexes backing both lookup shapes.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for chat-service");

        let user_time_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_time_idx".to_string())
                    .build(),
            )
            .build();

        let conversation_time_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "conversationId": 1, "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_conversation_time_idx".to_string())
                    .build(),
            )
            .build();

        self.turns
            .create_indexes([user_time_index, conversation_time_index], None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create history indexes: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), AppError> {
        self.turns.insert_one(turn, None).await.map_err(|e| {
            tracing::error!("Failed to insert conversation turn: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        Ok(())
    }

    async fn query_turns(&self, lookup: &HistoryLookup) -> Result<Vec<ConversationTurn>, AppError> {
        let mut filter = doc! { "userId": lookup.user_id.as_str() };
        if let Some(conversation_id) = &lookup.conversation_id {
            filter.insert("conversationId", conversation_id.as_str());
        }

        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .limit(i64::from(lookup.limit))
            .build();

        let cursor = self.turns.find(filter, options).await.map_err(|e| {
            tracing::error!("Failed to query history: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        let turns: Vec<ConversationTurn> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect history records: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        Ok(turns)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}
