use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::constants::USER_AGENT;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

/// Destination channel for normalized posts.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one text message.
    async fn send_text(&self, text: &str, disable_preview: bool) -> Result<(), TelegramError>;

    /// Send up to ten photos as one album.
    async fn send_photos(&self, urls: &[String]) -> Result<(), TelegramError>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media: &'a str,
}

#[derive(Debug, Serialize)]
struct SendMediaGroup<'a> {
    chat_id: &'a str,
    media: Vec<InputMediaPhoto<'a>>,
}

/// Bot API reply; `result` is ignored.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client bound to one channel.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    channel: String,
}

impl TelegramClient {
    /// Create a new Telegram client from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: format!("{}/bot{}", config.telegram_api_url, config.bot_token),
            channel: config.channel.clone(),
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &'static str,
        body: &B,
    ) -> Result<(), TelegramError> {
        debug!(method, channel = %self.channel, "Calling Telegram API");

        // Error replies carry a JSON body with a non-2xx status, so parse before checking it.
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let reply: ApiReply = match response.json().await {
            Ok(reply) => reply,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: status.to_string(),
                })
            }
        };

        if reply.ok {
            Ok(())
        } else {
            Err(TelegramError::Api {
                code: reply
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: reply.description.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn send_text(&self, text: &str, disable_preview: bool) -> Result<(), TelegramError> {
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id: &self.channel,
                text,
                disable_web_page_preview: disable_preview,
            },
        )
        .await
    }

    async fn send_photos(&self, urls: &[String]) -> Result<(), TelegramError> {
        let media = urls
            .iter()
            .map(|url| InputMediaPhoto {
                kind: "photo",
                media: url,
            })
            .collect();
        self.call(
            "sendMediaGroup",
            &SendMediaGroup {
                chat_id: &self.channel,
                media,
            },
        )
        .await
    }
}
