use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::notify::{build_message, RunReport};

/// Telegram caps message text at 4096 chars; stay under it.
const MAX_MESSAGE_CHARS: usize = 4000;

#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn send(&self, report: &RunReport) -> Result<()>;
}

pub struct StdoutSink;

#[async_trait]
impl NotifySink for StdoutSink {
    async fn send(&self, report: &RunReport) -> Result<()> {
        println!("{}", build_message(report));
        Ok(())
    }
}

pub struct TelegramSink {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("seo-variations/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build Telegram HTTP client");
        Self {
            client,
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }
}

#[async_trait]
impl NotifySink for TelegramSink {
    async fn send(&self, report: &RunReport) -> Result<()> {
        let text: String = build_message(report).chars().take(MAX_MESSAGE_CHARS).collect();
        self.client
            .post(self.endpoint())
            .json(&serde_json::json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
