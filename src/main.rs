//! Vocab Trainer - conversational vocabulary quiz bot
//!
//! Quizzes users on English words through a Telegram chat and lets each
//! user curate their own study list on top of a shared word catalog.

mod config;
mod db;
mod ledger;
mod lookup;
mod quiz;
mod runtime;
mod state_machine;
mod telegram;
mod texts;

use config::BotConfig;
use db::{Database, SEED_WORDS};
use lookup::DictionaryLookup;
use quiz::QuizSelector;
use runtime::{DatabaseStore, ProductionManager, SessionSettings};
use std::sync::Arc;
use std::time::Duration;
use telegram::TelegramClient;
use texts::Texts;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pause after a failed poll before trying again
const POLL_BACKOFF: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocab_trainer=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    let seeded = db.seed(SEED_WORDS)?;
    tracing::info!(seeded, catalog_size = db.catalog_size()?, "Word catalog ready");

    let store = Arc::new(DatabaseStore::new(db, config.store_timeout));
    let lookup = Arc::new(DictionaryLookup::new(&config.lookup_url, config.lookup_timeout)?);
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api,
        &config.bot_token,
        config.poll_timeout,
    )?);

    let selector = QuizSelector::new(config.min_catalog_size);
    let settings = SessionSettings {
        keywords: Arc::new(config.keywords.clone()),
        texts: Arc::new(Texts::default()),
        selector,
    };
    let manager: ProductionManager =
        runtime::RuntimeManager::new(store, lookup, Arc::clone(&telegram), settings);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
                shutdown.cancel();
            }
        }
    });

    tracing::info!(
        min_catalog_size = selector.min_catalog_size(),
        "Vocab trainer polling for updates"
    );

    let mut offset = 0;
    loop {
        let polled = tokio::select! {
            () = shutdown.cancelled() => break,
            polled = telegram.get_updates(offset) => polled,
        };

        match polled {
            Ok(updates) => {
                offset = telegram::next_offset(offset, &updates);
                for message in updates.into_iter().filter_map(telegram::inbound_message) {
                    let user_id = message.user_id;
                    if let Err(e) = manager.dispatch(message).await {
                        tracing::warn!(user_id, error = %e, "Failed to dispatch message");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Polling for updates failed");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(POLL_BACKOFF) => {}
                }
            }
        }
    }

    tracing::info!("Vocab trainer stopped");
    Ok(())
}
