//! Ownership ledger and user registry
//!
//! A word is studied by a user when it is in the catalog, the user has not
//! excluded it, and it was either seeded or explicitly added by that user.
//! Exclusions are permanent: adding the word again records a fresh include
//! but the word stays out of the studied list.

use crate::db::{UserId, WordPair};
use crate::runtime::{StoreError, WordStore};
use crate::state_machine::ErrorKind;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of adding a word for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The word is now on the user's list
    Added { word: WordPair, catalog_size: usize },
    /// The user had already added this word
    AlreadyOwned { source_word: String },
    /// The catalog already knew the word under a different translation; the
    /// user now owns the existing entry
    CatalogConflict {
        existing: WordPair,
        catalog_size: usize,
    },
}

impl AddOutcome {
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            AddOutcome::AlreadyOwned { .. } => Some(ErrorKind::DuplicateWord),
            AddOutcome::Added { .. } | AddOutcome::CatalogConflict { .. } => None,
        }
    }
}

/// Result of removing a word for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user never added the word (or already removed it)
    NotOwned,
    /// No such word in the catalog
    UnknownWord,
}

impl DeleteOutcome {
    pub fn error_kind(self) -> Option<ErrorKind> {
        match self {
            DeleteOutcome::Deleted => None,
            DeleteOutcome::NotOwned => Some(ErrorKind::NotOwned),
            DeleteOutcome::UnknownWord => Some(ErrorKind::UnknownWord),
        }
    }
}

/// Per-user view over the shared catalog
pub struct Ledger<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: WordStore + ?Sized> Ledger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Lookup-or-create the internal id for a platform user
    pub async fn ensure_user(&self, external_id: i64) -> Result<UserId, StoreError> {
        self.store.ensure_user(external_id).await
    }

    pub async fn add_word(
        &self,
        external_id: i64,
        source_word: &str,
        translation: &str,
    ) -> Result<AddOutcome, StoreError> {
        let existing = self.store.find_word(source_word).await?;

        if let (Some(entry), Some(user_id)) = (&existing, self.store.find_user(external_id).await?) {
            if self.owns(user_id, entry.id).await? {
                return Ok(AddOutcome::AlreadyOwned {
                    source_word: entry.source_word.clone(),
                });
            }
        }

        let word_id = self.store.insert_word_if_absent(source_word, translation).await?;
        let user_id = self.ensure_user(external_id).await?;
        self.store.add_ownership(user_id, word_id).await?;
        let catalog_size = self.store.catalog_size().await?;

        tracing::info!(external_id, word_id, source_word, "Word added to study list");

        Ok(match existing {
            Some(entry) if entry.translation != translation => AddOutcome::CatalogConflict {
                existing: entry.into(),
                catalog_size,
            },
            Some(entry) => AddOutcome::Added {
                word: entry.into(),
                catalog_size,
            },
            None => AddOutcome::Added {
                word: WordPair {
                    source_word: source_word.to_string(),
                    translation: translation.to_string(),
                },
                catalog_size,
            },
        })
    }

    pub async fn delete_word(
        &self,
        external_id: i64,
        source_word: &str,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(entry) = self.store.find_word(source_word).await? else {
            return Ok(DeleteOutcome::UnknownWord);
        };
        let Some(user_id) = self.store.find_user(external_id).await? else {
            return Ok(DeleteOutcome::NotOwned);
        };

        if !self.store.remove_ownership(user_id, entry.id).await? {
            return Ok(DeleteOutcome::NotOwned);
        }
        self.store.add_exclusion(user_id, entry.id).await?;

        tracing::info!(external_id, word_id = entry.id, source_word, "Word removed from study list");
        Ok(DeleteOutcome::Deleted)
    }

    /// Catalog entries the user studies, in catalog order
    pub async fn list_studied_words(&self, external_id: i64) -> Result<Vec<WordPair>, StoreError> {
        let catalog = self.store.list_catalog().await?;
        let (owned, excluded) = match self.store.find_user(external_id).await? {
            Some(user_id) => (
                self.store.list_owned(user_id).await?.into_iter().collect(),
                self.store.list_excluded(user_id).await?.into_iter().collect(),
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        Ok(catalog
            .into_iter()
            .filter(|w| !excluded.contains(&w.id) && (w.seeded || owned.contains(&w.id)))
            .map(WordPair::from)
            .collect())
    }

    /// Included and not excluded
    async fn owns(&self, user_id: UserId, word_id: i64) -> Result<bool, StoreError> {
        let included = self.store.list_owned(user_id).await?.contains(&word_id);
        if !included {
            return Ok(false);
        }
        Ok(!self.store.list_excluded(user_id).await?.contains(&word_id))
    }
}
