//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::db::{UserId, WordEntry, WordId, WordPair};
use crate::lookup::LookupError;
use crate::state_machine::Reply;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Word Store
// ============================================================================

#[derive(Default)]
struct StoreInner {
    words: Vec<WordEntry>,
    users: HashMap<i64, UserId>,
    owned: BTreeSet<(UserId, WordId)>,
    excluded: BTreeSet<(UserId, WordId)>,
    /// Next `random_word` position; rotates so consecutive rounds differ
    cursor: usize,
}

impl StoreInner {
    fn position(&self, source_word: &str) -> Option<usize> {
        let key = source_word.to_ascii_lowercase();
        self.words
            .iter()
            .position(|w| w.source_word.to_ascii_lowercase() == key)
    }
}

/// Ownership and exclusion records, for asserting a call left them alone
pub type LedgerSnapshot = (Vec<(UserId, WordId)>, Vec<(UserId, WordId)>);

/// In-memory word store with deterministic "random" picks
#[derive(Default)]
pub struct MockStore {
    inner: Mutex<StoreInner>,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given pairs marked as seed words
    pub fn with_seed(words: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap();
            for (index, (source_word, translation)) in words.iter().enumerate() {
                inner.words.push(WordEntry {
                    id: index as WordId + 1,
                    source_word: (*source_word).to_string(),
                    translation: (*translation).to_string(),
                    seeded: true,
                });
            }
        }
        store
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn catalog_len(&self) -> usize {
        self.inner.lock().unwrap().words.len()
    }

    pub fn word(&self, source_word: &str) -> Option<WordEntry> {
        let inner = self.inner.lock().unwrap();
        inner.position(source_word).map(|i| inner.words[i].clone())
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        let inner = self.inner.lock().unwrap();
        (
            inner.owned.iter().copied().collect(),
            inner.excluded.iter().copied().collect(),
        )
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("mock store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WordStore for MockStore {
    async fn random_word(&self) -> Result<Option<WordPair>, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        if inner.words.is_empty() {
            return Ok(None);
        }
        let index = inner.cursor % inner.words.len();
        inner.cursor = index + 1;
        Ok(Some(inner.words[index].clone().into()))
    }

    async fn distractors(&self, exclude: &str, n: usize) -> Result<Vec<String>, StoreError> {
        self.check()?;
        let exclude = exclude.to_ascii_lowercase();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .words
            .iter()
            .filter(|w| w.source_word.to_ascii_lowercase() != exclude)
            .take(n)
            .map(|w| w.source_word.clone())
            .collect())
    }

    async fn insert_word_if_absent(
        &self,
        source_word: &str,
        translation: &str,
    ) -> Result<WordId, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(i) = inner.position(source_word) {
            return Ok(inner.words[i].id);
        }
        let id = inner.words.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        inner.words.push(WordEntry {
            id,
            source_word: source_word.to_string(),
            translation: translation.to_string(),
            seeded: false,
        });
        Ok(id)
    }

    async fn find_word(&self, source_word: &str) -> Result<Option<WordEntry>, StoreError> {
        self.check()?;
        Ok(self.word(source_word))
    }

    async fn catalog_size(&self) -> Result<usize, StoreError> {
        self.check()?;
        Ok(self.catalog_len())
    }

    async fn list_catalog(&self) -> Result<Vec<WordEntry>, StoreError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().words.clone())
    }

    async fn ensure_user(&self, external_id: i64) -> Result<UserId, StoreError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let next_id = inner.users.len() as UserId + 1;
        Ok(*inner.users.entry(external_id).or_insert(next_id))
    }

    async fn find_user(&self, external_id: i64) -> Result<Option<UserId>, StoreError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().users.get(&external_id).copied())
    }

    async fn add_ownership(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.lock().unwrap().owned.insert((user_id, word_id));
        Ok(())
    }

    async fn remove_ownership(&self, user_id: UserId, word_id: WordId) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.inner.lock().unwrap().owned.remove(&(user_id, word_id)))
    }

    async fn add_exclusion(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.lock().unwrap().excluded.insert((user_id, word_id));
        Ok(())
    }

    async fn list_owned(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .owned
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, word_id)| *word_id)
            .collect())
    }

    async fn list_excluded(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .excluded
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, word_id)| *word_id)
            .collect())
    }
}

// ============================================================================
// Mock Example Lookup
// ============================================================================

/// Lookup that answers every word with the same example, or always fails
pub struct MockLookup {
    example: Option<String>,
    failing: bool,
    calls: AtomicUsize,
}

impl MockLookup {
    pub fn with_example(example: impl Into<String>) -> Self {
        Self {
            example: Some(example.into()),
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            example: None,
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExampleLookup for MockLookup {
    async fn fetch_example(&self, _word: &str) -> Result<Option<String>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(LookupError::Status(503));
        }
        Ok(self.example.clone())
    }
}

// ============================================================================
// Recording Transport
// ============================================================================

/// Transport that records every reply instead of sending it
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, Reply)>>,
    /// Replies to this chat never complete
    stalled_chat: Option<i64>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose sends to `chat_id` hang forever
    pub fn stalled_for(chat_id: i64) -> Self {
        Self {
            stalled_chat: Some(chat_id),
            ..Self::default()
        }
    }

    /// Drain the recorded replies
    pub fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.sent.lock().unwrap())
            .into_iter()
            .map(|(_, r)| r)
            .collect()
    }

    /// Chat ids of every recorded reply
    pub fn sent_to(&self) -> Vec<i64> {
        self.sent.lock().unwrap().iter().map(|(chat_id, _)| *chat_id).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        if self.stalled_chat == Some(chat_id) {
            std::future::pending::<()>().await;
        }
        self.sent.lock().unwrap().push((chat_id, reply.clone()));
        Ok(())
    }
}
