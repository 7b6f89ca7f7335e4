// src/bot/api.rs
// Thin Telegram Bot API client: long-poll getUpdates, sendMessage with
// optional Markdown, getChatMember for the admin guard.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::news::autonews::ChatSink;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        self.kind == "group" || self.kind == "supergroup"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("idx-news-bot/0.1")
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("building telegram http client")?;
        Ok(Self {
            client,
            base: format!("https://api.telegram.org/bot{token}"),
        })
    }

    /// Long poll for updates; the server holds the request up to
    /// `poll_secs`, so the client timeout sits above that.
    pub async fn get_updates(&self, offset: i64, poll_secs: u64) -> Result<Vec<Update>> {
        #[derive(Deserialize)]
        struct Envelope {
            ok: bool,
            #[serde(default)]
            result: Vec<Update>,
        }

        let resp = self
            .client
            .get(format!("{}/getUpdates", self.base))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", poll_secs.to_string()),
            ])
            .timeout(Duration::from_secs(poll_secs + 10))
            .send()
            .await
            .context("telegram getUpdates")?;
        if !resp.status().is_success() {
            bail!("telegram getUpdates returned status {}", resp.status());
        }
        let envelope: Envelope = resp.json().await.context("telegram getUpdates body")?;
        if !envelope.ok {
            bail!("telegram getUpdates replied ok=false");
        }
        Ok(envelope.result)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        #[derive(Serialize)]
        struct Payload<'a> {
            chat_id: i64,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<&'a str>,
        }

        let payload = Payload {
            chat_id,
            text,
            parse_mode: markdown.then_some("Markdown"),
        };
        self.client
            .post(format!("{}/sendMessage", self.base))
            .timeout(Duration::from_secs(15))
            .json(&payload)
            .send()
            .await
            .context("telegram sendMessage")?
            .error_for_status()
            .context("telegram sendMessage status")?;
        Ok(())
    }

    /// True iff `user_id` is an administrator or the owner of `chat_id`.
    /// Any lookup failure counts as "not an admin".
    pub async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> bool {
        #[derive(Deserialize)]
        struct Envelope {
            ok: bool,
            result: Option<Member>,
        }
        #[derive(Deserialize)]
        struct Member {
            status: String,
        }

        let resp = match self
            .client
            .get(format!("{}/getChatMember", self.base))
            .query(&[
                ("chat_id", chat_id.to_string()),
                ("user_id", user_id.to_string()),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(error = ?e, chat = chat_id, "getChatMember failed");
                return false;
            }
        };
        let envelope: Envelope = match resp.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = ?e, chat = chat_id, "getChatMember body unreadable");
                return false;
            }
        };
        matches!(
            (envelope.ok, envelope.result),
            (true, Some(Member { status })) if status == "administrator" || status == "creator"
        )
    }
}

#[async_trait]
impl ChatSink for TelegramClient {
    async fn send(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        self.send_message(chat_id, text, markdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_parses() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "date": 1755000000,
                "chat": {"id": -1001234, "type": "supergroup", "title": "Saham"},
                "from": {"id": 7, "is_bot": false, "first_name": "A"},
                "text": "/news BBCA"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.update_id, 10);
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, -1001234);
        assert!(msg.chat.is_group());
        assert_eq!(msg.from.unwrap().id, 7);
        assert_eq!(msg.text.as_deref(), Some("/news BBCA"));
    }

    #[test]
    fn non_message_update_parses() {
        let raw = r#"{"update_id": 11, "edited_message": {"x": 1}}"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn private_chat_is_not_group() {
        let chat: Chat = serde_json::from_str(r#"{"id": 5, "type": "private"}"#).unwrap();
        assert!(!chat.is_group());
    }
}
