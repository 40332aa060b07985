//! Minimal Telegram Bot API client
//!
//! Long-polls `getUpdates` for inbound text and sends replies with
//! `sendMessage`, attaching a reply keyboard when a reply offers choices.

pub mod types;

use crate::runtime::{InboundMessage, Transport, TransportError};
use crate::state_machine::Reply;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use types::{
    ApiResponse, GetUpdates, KeyboardButton, ReplyKeyboardMarkup, SendMessage, Update,
};

const BUTTONS_PER_ROW: usize = 2;

/// Slack on top of the long-poll timeout before the HTTP call gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            poll_timeout,
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Http(format!("{status}: {}", e.without_url())))?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TransportError::Api(
                description.unwrap_or_else(|| format!("{method} failed with {status}")),
            )),
        }
    }

    /// Fetch updates with id >= `offset`, waiting up to the poll timeout
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        let request = SendMessage {
            chat_id,
            text: &reply.text,
            parse_mode: "HTML",
            reply_markup: reply.choices.as_deref().map(keyboard),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        self.send_message(chat_id, reply).await
    }
}

/// Lay out choices two per row
pub fn keyboard(choices: &[String]) -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup {
        keyboard: choices
            .chunks(BUTTONS_PER_ROW)
            .map(|row| {
                row.iter()
                    .map(|text| KeyboardButton { text: text.clone() })
                    .collect()
            })
            .collect(),
        resize_keyboard: true,
    }
}

/// Text messages with a sender become inbound messages; anything else is
/// skipped.
pub fn inbound_message(update: Update) -> Option<InboundMessage> {
    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Skipping non-message update");
        return None;
    };
    let (Some(text), Some(from)) = (message.text, message.from) else {
        tracing::debug!(update_id = update.update_id, "Skipping non-text message");
        return None;
    };

    Some(InboundMessage {
        user_id: from.id,
        chat_id: message.chat.id,
        first_name: from.first_name,
        text,
    })
}

/// Offset that acknowledges every update in `updates`
pub fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map_or(current, |next| next.max(current))
}
