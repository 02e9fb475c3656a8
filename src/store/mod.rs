//! Browser-style local key/value storage.
//!
//! The visitor counter persists through a [`KeyValueStore`] so callers can
//! choose between process memory and an on-disk SQLite file.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors from a key/value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to create storage directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String-keyed string storage with `localStorage` semantics: no
/// transactions, last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}
