//! Domain models for the chat service.

pub mod turn;

pub use turn::ConversationTurn;
