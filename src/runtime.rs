//! Runtime for executing sessions
//!
//! Each user gets a session task fed through an mpsc channel, so one user's
//! messages are handled strictly in order while different users proceed
//! concurrently.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::config::Keywords;
use crate::lookup::DictionaryLookup;
use crate::quiz::QuizSelector;
use crate::state_machine::SessionContext;
use crate::telegram::TelegramClient;
use crate::texts::Texts;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Type alias for production runtime with concrete implementations
pub type ProductionManager = RuntimeManager<DatabaseStore, DictionaryLookup, TelegramClient>;

const SESSION_QUEUE_DEPTH: usize = 32;

/// A text message from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform user id; sessions are keyed by it
    pub user_id: i64,
    pub chat_id: i64,
    pub first_name: String,
    pub text: String,
}

/// Settings shared by every session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub keywords: Arc<Keywords>,
    pub texts: Arc<Texts>,
    pub selector: QuizSelector,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub inbound_tx: mpsc::Sender<InboundMessage>,
}

/// Manager for all session runtimes
pub struct RuntimeManager<S, L, T>
where
    S: WordStore + 'static,
    L: ExampleLookup + 'static,
    T: Transport + 'static,
{
    store: Arc<S>,
    lookup: Arc<L>,
    transport: Arc<T>,
    settings: SessionSettings,
    sessions: RwLock<HashMap<i64, SessionHandle>>,
}

impl<S, L, T> RuntimeManager<S, L, T>
where
    S: WordStore + 'static,
    L: ExampleLookup + 'static,
    T: Transport + 'static,
{
    pub fn new(store: Arc<S>, lookup: Arc<L>, transport: Arc<T>, settings: SessionSettings) -> Self {
        Self {
            store,
            lookup,
            transport,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the session for a user
    pub async fn get_or_create(&self, user_id: i64, chat_id: i64) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(&user_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        // Another dispatcher may have won the race for the write lock
        if let Some(handle) = sessions.get(&user_id) {
            return handle.clone();
        }

        let context = SessionContext::new(
            user_id,
            chat_id,
            Arc::clone(&self.settings.keywords),
            Arc::clone(&self.settings.texts),
        );
        let runtime = SessionRuntime::new(
            context,
            Arc::clone(&self.store),
            self.settings.selector,
            Arc::clone(&self.lookup),
            Arc::clone(&self.transport),
            StdRng::from_entropy(),
        );

        let (inbound_tx, inbound_rx) = mpsc::channel(SESSION_QUEUE_DEPTH);
        tokio::spawn(async move {
            runtime.run(inbound_rx).await;
        });

        tracing::info!(user_id, "Created session");
        let handle = SessionHandle { inbound_tx };
        sessions.insert(user_id, handle.clone());
        handle
    }

    /// Queue a message on its user's session.
    ///
    /// Never waits on a session: when a user's queue is full the message is
    /// dropped, so one stalled session cannot hold up everyone else.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<(), String> {
        let (user_id, chat_id) = (message.user_id, message.chat_id);
        let handle = self.get_or_create(user_id, chat_id).await;

        let message = match handle.inbound_tx.try_send(message) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(user_id, "Session queue full, dropping message");
                return Err(format!("Session queue for user {user_id} is full"));
            }
            Err(TrySendError::Closed(message)) => message,
        };

        // The session task is gone; start a fresh one
        tracing::warn!(user_id, "Session runtime closed, restarting");
        self.sessions.write().await.remove(&user_id);
        self.get_or_create(user_id, chat_id)
            .await
            .inbound_tx
            .try_send(message)
            .map_err(|e| format!("Failed to queue message: {e}"))
    }

    /// Drop a user's session; their next message starts from scratch
    #[allow(dead_code)] // Used in tests
    pub async fn clear(&self, user_id: i64) -> bool {
        self.sessions.write().await.remove(&user_id).is_some()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
