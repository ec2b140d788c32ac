//! Telegram Bot API transport

use async_trait::async_trait;

use crate::config::DEFAULT_TELEGRAM_API_URL;
use crate::error::TransportError;

use super::{MessageTransport, DEFAULT_NOTIFY_TIMEOUT};

pub struct TelegramTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TelegramTransport {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_TELEGRAM_API_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, client, token)
    }

    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError> {
        let token = self
            .token
            .as_deref()
            .ok_or(TransportError::MissingCredentials)?;
        let url = format!("{}/bot{}/sendMessage", self.base_url, token);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", destination),
                ("text", text),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
