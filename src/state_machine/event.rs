//! Events that can occur in a session

use super::state::{Action, ErrorKind};
use crate::config::Keywords;
use crate::db::WordPair;
use crate::ledger::{AddOutcome, DeleteOutcome};
use crate::quiz::Round;

/// Commands recognized in every phase, ahead of any phase handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/cards`
    Start,
    /// `/help`
    Help,
    /// `/all_words`
    ListWords,
    AddWord,
    DeleteWord,
    Next,
}

impl Command {
    /// Recognize a command in raw user text.
    ///
    /// Reserved keywords match verbatim (surrounding whitespace aside).
    /// Slash commands may carry a `@botname` suffix.
    pub fn parse(text: &str, keywords: &Keywords) -> Option<Self> {
        let text = text.trim();
        if text == keywords.add_word {
            return Some(Command::AddWord);
        }
        if text == keywords.delete_word {
            return Some(Command::DeleteWord);
        }
        if text == keywords.next {
            return Some(Command::Next);
        }

        let slash = text.strip_prefix('/')?;
        let name = slash.split_whitespace().next()?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" | "cards" => Some(Command::Start),
            "help" => Some(Command::Help),
            "all_words" => Some(Command::ListWords),
            _ => None,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    Start {
        first_name: String,
        /// First `/start` of this session
        greet: bool,
    },
    Help,
    ListWords,
    AddWordRequested,
    DeleteWordRequested,
    NextRequested,
    UserText {
        text: String,
    },

    // Effect outcomes
    RoundReady {
        round: Round,
    },
    CatalogEmpty,
    CatalogTooSmall {
        available: usize,
        required: usize,
    },
    WordAdded {
        outcome: AddOutcome,
    },
    WordDeleted {
        source_word: String,
        outcome: DeleteOutcome,
    },
    ExampleFetched {
        example: Option<String>,
    },
    StudiedWords {
        words: Vec<WordPair>,
    },
    ActionFailed {
        action: Action,
        kind: ErrorKind,
    },
}

impl Event {
    /// Turn raw user text into an event. Commands take precedence over
    /// plain text in every phase.
    pub fn from_user_text(text: &str, first_name: &str, greet: bool, keywords: &Keywords) -> Self {
        match Command::parse(text, keywords) {
            Some(Command::Start) => Event::Start {
                first_name: first_name.to_string(),
                greet,
            },
            Some(Command::Help) => Event::Help,
            Some(Command::ListWords) => Event::ListWords,
            Some(Command::AddWord) => Event::AddWordRequested,
            Some(Command::DeleteWord) => Event::DeleteWordRequested,
            Some(Command::Next) => Event::NextRequested,
            None => Event::UserText {
                text: text.to_string(),
            },
        }
    }
}
