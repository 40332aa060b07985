//! Quiz round selection
//!
//! A round is one target word (shown by its translation) plus up to three
//! distractor words, presented in shuffled order.

#[cfg(test)]
mod proptests;

use crate::db::WordPair;
use crate::runtime::{StoreError, WordStore};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub const DISTRACTOR_COUNT: usize = 3;

/// One quiz presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub target: WordPair,
    pub distractors: Vec<String>,
    /// Target plus distractors in display order
    pub options: Vec<String>,
}

impl Round {
    /// Build a round from a target and candidate distractors.
    ///
    /// Candidates equal to the target or to an earlier candidate (ignoring
    /// case) are dropped, at most [`DISTRACTOR_COUNT`] are kept, and the
    /// options are shuffled.
    pub fn new<R: Rng + ?Sized>(target: WordPair, candidates: Vec<String>, rng: &mut R) -> Self {
        let mut seen = vec![normalize(&target.source_word)];
        let mut distractors = Vec::with_capacity(DISTRACTOR_COUNT);
        for candidate in candidates {
            if distractors.len() == DISTRACTOR_COUNT {
                break;
            }
            let key = normalize(&candidate);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            distractors.push(candidate);
        }

        let mut options = Vec::with_capacity(distractors.len() + 1);
        options.push(target.source_word.clone());
        options.extend(distractors.iter().cloned());
        options.shuffle(rng);

        Self {
            target,
            distractors,
            options,
        }
    }

    /// Whether `answer` names the target word
    pub fn is_correct(&self, answer: &str) -> bool {
        normalize(answer) == normalize(&self.target.source_word)
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("catalog has {available} words, rounds need at least {required}")]
    NotEnoughWords { available: usize, required: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Picks the target and distractors for the next round
#[derive(Debug, Clone, Copy)]
pub struct QuizSelector {
    min_catalog_size: usize,
}

impl QuizSelector {
    pub fn new(min_catalog_size: usize) -> Self {
        Self {
            min_catalog_size: min_catalog_size.max(1),
        }
    }

    pub fn min_catalog_size(&self) -> usize {
        self.min_catalog_size
    }

    /// Select a round from the catalog.
    ///
    /// Catalogs smaller than the configured minimum are refused with
    /// [`QuizError::NotEnoughWords`]. Above the minimum but below four
    /// entries the round carries fewer distractors.
    pub async fn select_round<S, R>(&self, store: &S, rng: &mut R) -> Result<Round, QuizError>
    where
        S: WordStore + ?Sized,
        R: Rng + Send + ?Sized,
    {
        let available = store.catalog_size().await?;
        if available == 0 {
            return Err(QuizError::EmptyCatalog);
        }
        if available < self.min_catalog_size {
            return Err(QuizError::NotEnoughWords {
                available,
                required: self.min_catalog_size,
            });
        }

        // The catalog may have been emptied between the two calls
        let target = store.random_word().await?.ok_or(QuizError::EmptyCatalog)?;
        let candidates = store
            .distractors(&target.source_word, DISTRACTOR_COUNT)
            .await?;

        Ok(Round::new(target, candidates, rng))
    }
}

/// Folds ASCII case only, the same way SQLite's `NOCASE` does, so two words
/// are equal here exactly when the catalog treats them as one entry
fn normalize(word: &str) -> String {
    word.trim().to_ascii_lowercase()
}
