//! Pure state transition function
//!
//! Given the same state, context and event this always yields the same new
//! state and effects; all I/O happens in the runtime executing the effects.

use super::event::Event;
use super::state::{Action, ErrorKind, SessionContext, SessionState, MAX_WORD_CHARS};
use super::Effect;
use crate::ledger::{AddOutcome, DeleteOutcome};
use crate::quiz::{Round, DISTRACTOR_COUNT};
use thiserror::Error;

/// Upper bound on answer buttons shown for a round
const MAX_QUIZ_OPTIONS: usize = DISTRACTOR_COUNT + 1;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let texts = &context.texts;
    let keywords = &context.keywords;

    match (state, event) {
        // ============================================================
        // Commands: recognized in every phase
        // ============================================================
        (_, Event::Start { first_name, greet }) => {
            let mut result = TransitionResult::new(SessionState::default());
            if greet {
                result = result.with_effect(Effect::reply(texts.welcome(
                    &first_name,
                    &keywords.add_word,
                    &keywords.delete_word,
                )));
            }
            Ok(result.with_effect(Effect::SelectRound))
        }

        (_, Event::Help) => Ok(TransitionResult::new(state.clone()).with_effect(help(context))),

        (_, Event::ListWords) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::ListStudiedWords))
        }

        (_, Event::AddWordRequested) => Ok(TransitionResult::new(SessionState::AwaitingNewWord)
            .with_effect(Effect::reply(texts.add_prompt.clone()))),

        (_, Event::DeleteWordRequested) => {
            Ok(TransitionResult::new(SessionState::AwaitingDeleteTarget)
                .with_effect(Effect::reply(texts.delete_prompt.clone())))
        }

        (_, Event::NextRequested) => {
            Ok(TransitionResult::new(SessionState::default()).with_effect(Effect::SelectRound))
        }

        // ============================================================
        // Add-word dialogue
        // ============================================================
        (SessionState::AwaitingNewWord, Event::UserText { text }) => match validate_word(&text) {
            Ok(source_word) => Ok(TransitionResult::new(SessionState::AwaitingNewTranslation {
                source_word,
            })
            .with_effect(Effect::reply(texts.translation_prompt.clone()))),
            Err(reprompt) => Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::reply(reprompt.message(context)))),
        },

        (SessionState::AwaitingNewTranslation { source_word }, Event::UserText { text }) => {
            match validate_word(&text) {
                Ok(translation) => Ok(TransitionResult::new(SessionState::default())
                    .with_effect(Effect::AddWord {
                        source_word: source_word.clone(),
                        translation,
                    })),
                Err(reprompt) => Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(reprompt.message(context)))),
            }
        }

        (SessionState::Quiz { round: None }, Event::WordAdded { outcome }) => {
            let replies = match outcome {
                AddOutcome::Added { word, catalog_size } => vec![
                    Effect::reply(texts.added(&word.source_word, &word.translation)),
                    Effect::reply(texts.total(catalog_size)),
                ],
                AddOutcome::AlreadyOwned { source_word } => {
                    vec![Effect::reply(texts.already_owned(&source_word))]
                }
                AddOutcome::CatalogConflict {
                    existing,
                    catalog_size,
                } => vec![
                    Effect::reply(texts.catalog_conflict(&existing.source_word, &existing.translation)),
                    Effect::reply(texts.total(catalog_size)),
                ],
            };
            Ok(TransitionResult::new(SessionState::default())
                .with_effects(replies)
                .with_effect(Effect::SelectRound))
        }

        // ============================================================
        // Delete-word dialogue
        // ============================================================
        (SessionState::AwaitingDeleteTarget, Event::UserText { text }) => {
            match validate_word(&text) {
                Ok(source_word) => Ok(TransitionResult::new(SessionState::default())
                    .with_effect(Effect::DeleteWord { source_word })),
                Err(reprompt) => Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(reprompt.message(context)))),
            }
        }

        (SessionState::Quiz { round: None }, Event::WordDeleted { source_word, outcome }) => {
            let text = match outcome {
                DeleteOutcome::Deleted => texts.deleted(&source_word),
                DeleteOutcome::NotOwned => texts.not_owned.clone(),
                DeleteOutcome::UnknownWord => texts.unknown_word.clone(),
            };
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(text))
                .with_effect(Effect::SelectRound))
        }

        // ============================================================
        // Quiz
        // ============================================================
        (SessionState::Quiz { .. }, Event::RoundReady { round }) => {
            let prompt = round_prompt(&round, context);
            Ok(TransitionResult::new(SessionState::Quiz { round: Some(round) }).with_effect(prompt))
        }

        (SessionState::Quiz { .. }, Event::CatalogEmpty) => {
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(texts.no_words.clone())))
        }

        (SessionState::Quiz { .. }, Event::CatalogTooSmall { available, required }) => {
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(texts.not_enough_words(available, required))))
        }

        (SessionState::Quiz { round: Some(round) }, Event::UserText { text }) => {
            if round.is_correct(&text) {
                Ok(TransitionResult::new(SessionState::default())
                    .with_effect(Effect::reply(texts.correct.clone()))
                    .with_effect(Effect::FetchExample {
                        source_word: round.target.source_word.clone(),
                    }))
            } else {
                // Same round stays open for another try
                Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(texts.incorrect.clone())))
            }
        }

        (SessionState::Quiz { round: None }, Event::UserText { .. }) => {
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(texts.no_active_round.clone()))
                .with_effect(Effect::SelectRound))
        }

        (SessionState::Quiz { round: None }, Event::ExampleFetched { example }) => {
            let result = TransitionResult::new(SessionState::default());
            let result = match example {
                Some(example) => result.with_effect(Effect::reply(texts.example(&example))),
                None => result,
            };
            Ok(result.with_effect(Effect::SelectRound))
        }

        // ============================================================
        // Word list
        // ============================================================
        (_, Event::StudiedWords { words }) => {
            let list = texts.word_list(
                words
                    .iter()
                    .map(|w| (w.source_word.as_str(), w.translation.as_str())),
            );
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::reply(list))
                .with_effect(help(context)))
        }

        // ============================================================
        // Failures: always leave the session navigable
        // ============================================================
        (_, Event::ActionFailed { action: Action::ListWords, .. }) => {
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(texts.list_failed.clone()))
                .with_effect(Effect::SelectRound))
        }

        // No follow-up round here, it would fail the same way
        (_, Event::ActionFailed { action: Action::SelectRound, kind }) => {
            let text = if kind == ErrorKind::EmptyCatalog {
                texts.no_words.clone()
            } else {
                texts.round_failed(&keywords.next)
            };
            Ok(TransitionResult::new(SessionState::default()).with_effect(Effect::reply(text)))
        }

        (_, Event::ActionFailed { action, .. }) => {
            let text = if action == Action::AddWord {
                texts.add_failed.clone()
            } else {
                texts.delete_failed.clone()
            };
            Ok(TransitionResult::new(SessionState::default())
                .with_effect(Effect::reply(text))
                .with_effect(Effect::SelectRound))
        }

        // ============================================================
        // Anything else is a runtime bug
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in phase {}",
            state.phase()
        ))),
    }
}

/// Why a text input was not accepted
enum Reprompt {
    Empty,
    TooLong,
}

impl Reprompt {
    fn message(&self, context: &SessionContext) -> String {
        match self {
            Reprompt::Empty => context.texts.empty_input.clone(),
            Reprompt::TooLong => context.texts.too_long(MAX_WORD_CHARS),
        }
    }
}

fn validate_word(text: &str) -> Result<String, Reprompt> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(Reprompt::Empty)
    } else if trimmed.chars().count() > MAX_WORD_CHARS {
        Err(Reprompt::TooLong)
    } else {
        Ok(trimmed.to_string())
    }
}

fn help(context: &SessionContext) -> Effect {
    let keywords = &context.keywords;
    Effect::reply(context.texts.help(
        &keywords.add_word,
        &keywords.delete_word,
        &keywords.next,
    ))
}

/// Prompt for a round: shuffled options, then the reserved keywords
fn round_prompt(round: &Round, context: &SessionContext) -> Effect {
    let keywords = &context.keywords;
    let mut choices: Vec<String> = round.options.iter().take(MAX_QUIZ_OPTIONS).cloned().collect();
    choices.extend([
        keywords.next.clone(),
        keywords.add_word.clone(),
        keywords.delete_word.clone(),
    ]);
    Effect::reply_with_choices(context.texts.guess(&round.target.translation), choices)
}
