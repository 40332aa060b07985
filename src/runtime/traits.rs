//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the session runtime with mock implementations.

use crate::db::{Database, DbResult, UserId, WordEntry, WordId, WordPair};
use crate::lookup::LookupError;
use crate::state_machine::Reply;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<crate::db::DbError> for StoreError {
    fn from(e: crate::db::DbError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Http(String),
    #[error("transport rejected request: {0}")]
    Api(String),
}

/// Catalog store, user registry and ownership records
#[async_trait]
pub trait WordStore: Send + Sync {
    /// One catalog entry picked uniformly at random
    async fn random_word(&self) -> Result<Option<WordPair>, StoreError>;

    /// Up to `n` random distinct source words, never `exclude`
    async fn distractors(&self, exclude: &str, n: usize) -> Result<Vec<String>, StoreError>;

    /// Insert-or-get by source word; concurrent inserts resolve to one row
    async fn insert_word_if_absent(
        &self,
        source_word: &str,
        translation: &str,
    ) -> Result<WordId, StoreError>;

    async fn find_word(&self, source_word: &str) -> Result<Option<WordEntry>, StoreError>;

    async fn catalog_size(&self) -> Result<usize, StoreError>;

    async fn list_catalog(&self) -> Result<Vec<WordEntry>, StoreError>;

    async fn ensure_user(&self, external_id: i64) -> Result<UserId, StoreError>;

    async fn find_user(&self, external_id: i64) -> Result<Option<UserId>, StoreError>;

    async fn add_ownership(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError>;

    /// Returns whether an include record existed
    async fn remove_ownership(&self, user_id: UserId, word_id: WordId) -> Result<bool, StoreError>;

    async fn add_exclusion(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError>;

    async fn list_owned(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError>;

    async fn list_excluded(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError>;
}

/// Usage-example service
#[async_trait]
pub trait ExampleLookup: Send + Sync {
    /// `Ok(None)` when the service knows no example for the word
    async fn fetch_example(&self, word: &str) -> Result<Option<String>, LookupError>;
}

/// Outbound half of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError>;
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use [`Database`] as a [`WordStore`]
///
/// SQLite calls run on the blocking pool and are bounded by `timeout`.
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
    timeout: Duration,
}

impl DatabaseStore {
    pub fn new(db: Database, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        let task = tokio::task::spawn_blocking(move || op(&db));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map_err(StoreError::from),
            Ok(Err(join_error)) => Err(StoreError::Unavailable(join_error.to_string())),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl WordStore for DatabaseStore {
    async fn random_word(&self) -> Result<Option<WordPair>, StoreError> {
        self.run(Database::random_word).await
    }

    async fn distractors(&self, exclude: &str, n: usize) -> Result<Vec<String>, StoreError> {
        let exclude = exclude.to_string();
        self.run(move |db| db.distractors(&exclude, n)).await
    }

    async fn insert_word_if_absent(
        &self,
        source_word: &str,
        translation: &str,
    ) -> Result<WordId, StoreError> {
        let source_word = source_word.to_string();
        let translation = translation.to_string();
        self.run(move |db| db.insert_word_if_absent(&source_word, &translation))
            .await
    }

    async fn find_word(&self, source_word: &str) -> Result<Option<WordEntry>, StoreError> {
        let source_word = source_word.to_string();
        self.run(move |db| db.find_word(&source_word)).await
    }

    async fn catalog_size(&self) -> Result<usize, StoreError> {
        self.run(Database::catalog_size).await
    }

    async fn list_catalog(&self) -> Result<Vec<WordEntry>, StoreError> {
        self.run(Database::list_catalog).await
    }

    async fn ensure_user(&self, external_id: i64) -> Result<UserId, StoreError> {
        self.run(move |db| db.ensure_user(external_id)).await
    }

    async fn find_user(&self, external_id: i64) -> Result<Option<UserId>, StoreError> {
        self.run(move |db| db.find_user(external_id)).await
    }

    async fn add_ownership(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        self.run(move |db| db.add_ownership(user_id, word_id)).await
    }

    async fn remove_ownership(&self, user_id: UserId, word_id: WordId) -> Result<bool, StoreError> {
        self.run(move |db| db.remove_ownership(user_id, word_id)).await
    }

    async fn add_exclusion(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        self.run(move |db| db.add_exclusion(user_id, word_id)).await
    }

    async fn list_owned(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError> {
        self.run(move |db| db.list_owned(user_id)).await
    }

    async fn list_excluded(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError> {
        self.run(move |db| db.list_excluded(user_id)).await
    }
}
