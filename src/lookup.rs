//! Usage-example lookup against a free dictionary API
//!
//! Best effort: callers degrade to "no example" on any error.

use crate::runtime::ExampleLookup;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid lookup url: {0}")]
    InvalidUrl(String),
    #[error("lookup request timed out")]
    Timeout,
    #[error("lookup request failed: {0}")]
    Http(String),
    #[error("lookup service returned status {0}")]
    Status(u16),
    #[error("could not decode lookup response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else {
            LookupError::Http(e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    example: Option<String>,
}

/// Client for `api.dictionaryapi.dev`-shaped services
pub struct DictionaryLookup {
    client: Client,
    base_url: Url,
}

impl DictionaryLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let base_url = Url::parse(base_url).map_err(|e| LookupError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(LookupError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn entry_url(&self, word: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl ExampleLookup for DictionaryLookup {
    async fn fetch_example(&self, word: &str) -> Result<Option<String>, LookupError> {
        let url = self.entry_url(word)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            // The service answers 404 for words it has no entry for
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let entries: Vec<DictionaryEntry> = response.json().await?;
                Ok(first_example(&entries))
            }
            status => Err(LookupError::Status(status.as_u16())),
        }
    }
}

fn first_example(entries: &[DictionaryEntry]) -> Option<String> {
    entries
        .first()?
        .meanings
        .iter()
        .flat_map(|m| &m.definitions)
        .find_map(|d| d.example.as_deref().map(str::trim).filter(|e| !e.is_empty()))
        .map(str::to_string)
}
