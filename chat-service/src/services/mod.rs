pub mod database;
pub mod memory;
pub mod providers;

pub use database::{HistoryLookup, HistoryStore, MongoHistoryStore};
pub use memory::InMemoryHistoryStore;
