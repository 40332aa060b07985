//! Effects produced by state transitions

/// A message for the user, optionally with reply buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Buttons to show; `None` leaves the current keyboard in place
    pub choices: Option<Vec<String>>,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the session's chat
    Reply(Reply),

    /// Pick the next round
    SelectRound,

    /// Add a word to the user's study list
    AddWord {
        source_word: String,
        translation: String,
    },

    /// Remove a word from the user's study list
    DeleteWord { source_word: String },

    /// Look up a usage example for a word
    FetchExample { source_word: String },

    /// Load every word the user currently studies
    ListStudiedWords,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply {
            text: text.into(),
            choices: None,
        })
    }

    pub fn reply_with_choices(text: impl Into<String>, choices: Vec<String>) -> Self {
        Effect::Reply(Reply {
            text: text.into(),
            choices: Some(choices),
        })
    }
}
