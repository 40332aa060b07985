//! Session runtime executor

use super::traits::{ExampleLookup, Transport, WordStore};
use super::InboundMessage;

use crate::ledger::Ledger;
use crate::quiz::{QuizError, QuizSelector};
use crate::state_machine::transition::TransitionError;
use crate::state_machine::{
    transition, Action, Effect, ErrorKind, Event, SessionContext, SessionState,
};
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One user's dialogue: owns the session state and executes effects
/// against any store, lookup and transport implementation.
pub struct SessionRuntime<S, L, T>
where
    S: WordStore + 'static,
    L: ExampleLookup + 'static,
    T: Transport + 'static,
{
    context: SessionContext,
    state: SessionState,
    store: Arc<S>,
    ledger: Ledger<S>,
    selector: QuizSelector,
    lookup: Arc<L>,
    transport: Arc<T>,
    rng: StdRng,
    /// Whether `/start` has been answered with the welcome text
    greeted: bool,
}

impl<S, L, T> SessionRuntime<S, L, T>
where
    S: WordStore + 'static,
    L: ExampleLookup + 'static,
    T: Transport + 'static,
{
    pub fn new(
        context: SessionContext,
        store: Arc<S>,
        selector: QuizSelector,
        lookup: Arc<L>,
        transport: Arc<T>,
        rng: StdRng,
    ) -> Self {
        Self {
            context,
            state: SessionState::default(),
            ledger: Ledger::new(Arc::clone(&store)),
            store,
            selector,
            lookup,
            transport,
            rng,
            greeted: false,
        }
    }

    #[allow(dead_code)] // Inspected by tests
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Process inbound messages one at a time until the channel closes
    pub async fn run(mut self, mut inbound_rx: mpsc::Receiver<InboundMessage>) {
        tracing::info!(user_id = self.context.user_id, "Starting session runtime");

        while let Some(message) = inbound_rx.recv().await {
            self.handle_inbound(message).await;
        }

        tracing::info!(user_id = self.context.user_id, "Session runtime stopped");
    }

    pub async fn handle_inbound(&mut self, message: InboundMessage) {
        let event = Event::from_user_text(
            &message.text,
            &message.first_name,
            !self.greeted,
            &self.context.keywords,
        );
        if matches!(event, Event::Start { .. }) {
            self.greeted = true;
        }

        if let Err(e) = self.process_event(event).await {
            // Should be unreachable; keep the session usable anyway
            tracing::error!(user_id = self.context.user_id, error = %e, "Dropping event");
            self.state = SessionState::default();
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Effects may produce follow-up events; handle them in a loop
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = transition(&self.state, &self.context, current_event)?;

            let old_state = std::mem::replace(&mut self.state, result.new_state);
            if old_state.phase() != self.state.phase() {
                tracing::debug!(
                    user_id = self.context.user_id,
                    from = %old_state.phase(),
                    to = %self.state.phase(),
                    "Session phase changed"
                );
            }

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    /// Perform one effect. Failures become events so the state machine
    /// decides how the session recovers.
    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        let user_id = self.context.user_id;

        match effect {
            Effect::Reply(reply) => {
                if let Err(e) = self.transport.send_reply(self.context.chat_id, &reply).await {
                    tracing::error!(user_id, error = %e, "Failed to send reply");
                }
                None
            }

            Effect::SelectRound => {
                match self.selector.select_round(&*self.store, &mut self.rng).await {
                    Ok(round) => Some(Event::RoundReady { round }),
                    Err(QuizError::EmptyCatalog) => Some(Event::CatalogEmpty),
                    Err(QuizError::NotEnoughWords { available, required }) => {
                        Some(Event::CatalogTooSmall { available, required })
                    }
                    Err(QuizError::Store(e)) => {
                        tracing::warn!(user_id, error = %e, "Round selection failed");
                        Some(store_failure(Action::SelectRound))
                    }
                }
            }

            Effect::AddWord {
                source_word,
                translation,
            } => match self.ledger.add_word(user_id, &source_word, &translation).await {
                Ok(outcome) => {
                    if let Some(kind) = outcome.error_kind() {
                        tracing::info!(user_id, source_word = %source_word, ?kind, "Word not added");
                    }
                    Some(Event::WordAdded { outcome })
                }
                Err(e) => {
                    tracing::warn!(user_id, source_word = %source_word, error = %e, "Adding word failed");
                    Some(store_failure(Action::AddWord))
                }
            },

            Effect::DeleteWord { source_word } => {
                match self.ledger.delete_word(user_id, &source_word).await {
                    Ok(outcome) => {
                        if let Some(kind) = outcome.error_kind() {
                            tracing::info!(user_id, source_word = %source_word, ?kind, "Word not deleted");
                        }
                        Some(Event::WordDeleted {
                            source_word,
                            outcome,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(user_id, source_word = %source_word, error = %e, "Deleting word failed");
                        Some(store_failure(Action::DeleteWord))
                    }
                }
            }

            Effect::FetchExample { source_word } => {
                let example = match self.lookup.fetch_example(&source_word).await {
                    Ok(example) => example,
                    Err(e) => {
                        tracing::warn!(
                            user_id,
                            source_word = %source_word,
                            kind = ?ErrorKind::LookupUnavailable,
                            error = %e,
                            "Example lookup failed"
                        );
                        None
                    }
                };
                Some(Event::ExampleFetched { example })
            }

            Effect::ListStudiedWords => match self.ledger.list_studied_words(user_id).await {
                Ok(words) => Some(Event::StudiedWords { words }),
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Listing words failed");
                    Some(store_failure(Action::ListWords))
                }
            },
        }
    }
}

fn store_failure(action: Action) -> Event {
    Event::ActionFailed {
        action,
        kind: ErrorKind::StoreUnavailable,
    }
}
