//! Session state types

use crate::config::Keywords;
use crate::quiz::Round;
use crate::texts::Texts;
use std::fmt;
use std::sync::Arc;

/// Longest word or translation accepted in the add-word dialogue
pub const MAX_WORD_CHARS: usize = 50;

/// Per-user conversational state
///
/// Each phase carries only the data that phase needs, so moving to another
/// phase drops whatever the previous one had pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Default phase. Holds the round awaiting an answer, if any.
    Quiz { round: Option<Round> },

    /// Waiting for the source word of a new entry
    AwaitingNewWord,

    /// Waiting for the translation of `source_word`
    AwaitingNewTranslation { source_word: String },

    /// Waiting for the word to remove from the study list
    AwaitingDeleteTarget,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Quiz { round: None }
    }
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Quiz { .. } => Phase::Quiz,
            SessionState::AwaitingNewWord => Phase::AwaitingNewWord,
            SessionState::AwaitingNewTranslation { .. } => Phase::AwaitingNewTranslation,
            SessionState::AwaitingDeleteTarget => Phase::AwaitingDeleteTarget,
        }
    }

    /// The round currently awaiting an answer
    pub fn round(&self) -> Option<&Round> {
        match self {
            SessionState::Quiz { round } => round.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Quiz,
    AwaitingNewWord,
    AwaitingNewTranslation,
    AwaitingDeleteTarget,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Quiz => "quiz",
            Phase::AwaitingNewWord => "awaiting_new_word",
            Phase::AwaitingNewTranslation => "awaiting_new_translation",
            Phase::AwaitingDeleteTarget => "awaiting_delete_target",
        };
        f.write_str(name)
    }
}

/// Failure classification surfaced to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No words to quiz
    EmptyCatalog,
    /// Add attempted for a word the user already owns
    DuplicateWord,
    /// Delete attempted on a word missing from the catalog
    UnknownWord,
    /// Delete attempted on a word the user never added
    NotOwned,
    /// A persistence call failed or timed out
    StoreUnavailable,
    /// The example service failed; never fatal
    LookupUnavailable,
}

/// The user action a failure interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectRound,
    AddWord,
    DeleteWord,
    ListWords,
}

/// Immutable configuration for a session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Platform user id the session belongs to
    pub user_id: i64,
    /// Chat replies are sent to
    pub chat_id: i64,
    pub keywords: Arc<Keywords>,
    pub texts: Arc<Texts>,
}

impl SessionContext {
    pub fn new(user_id: i64, chat_id: i64, keywords: Arc<Keywords>, texts: Arc<Texts>) -> Self {
        Self {
            user_id,
            chat_id,
            keywords,
            texts,
        }
    }
}
