//! HTTP handlers for the chat service.

pub mod chat;
pub mod health;
pub mod history;

pub use chat::chat;
pub use health::{health_check, readiness_check};
pub use history::get_history;
