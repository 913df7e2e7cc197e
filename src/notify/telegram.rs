//! Telegram Bot API delivery plus a helper to discover the chat id.

use super::Notifier;
use crate::config::TelegramCredentials;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram wraps every result in `{"ok": ..., "result": ..., "description": ...}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiResponse<serde_json::Value>>(body) {
        Ok(parsed) => format!(
            "Telegram API error: {} (code {})",
            parsed.description.as_deref().unwrap_or("Unknown error"),
            parsed.error_code.unwrap_or(status.as_u16() as i64)
        ),
        Err(_) => format!("Telegram API error ({}): {}", status, body),
    }
}

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    credentials: TelegramCredentials,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, credentials: TelegramCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.credentials.bot_token, method)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let params = [("chat_id", self.credentials.chat_id.as_str()), ("text", message)];

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&params)
            .send()
            .await
            .context("Telegram sendMessage request failed")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!(describe_error(status, &body));
        }

        let parsed: ApiResponse<serde_json::Value> =
            serde_json::from_str(&body).context("failed to parse Telegram response")?;
        if !parsed.ok {
            anyhow::bail!(describe_error(status, &body));
        }
        Ok(())
    }
}

/// Chat that most recently messaged the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredChat {
    pub chat_id: i64,
    pub first_name: Option<String>,
}

/// Pick the latest update that carries a message.
pub fn latest_chat(body: &str) -> Result<Option<DiscoveredChat>> {
    let parsed: ApiResponse<Vec<Update>> =
        serde_json::from_str(body).context("failed to parse getUpdates response")?;
    if !parsed.ok {
        anyhow::bail!(
            "Telegram API error: {}",
            parsed.description.as_deref().unwrap_or("Unknown error")
        );
    }
    Ok(parsed
        .result
        .unwrap_or_default()
        .into_iter()
        .rev()
        .find_map(|u| u.message)
        .map(|m| DiscoveredChat {
            chat_id: m.chat.id,
            first_name: m.chat.first_name,
        }))
}

/// Poll `getUpdates` until someone messages the bot, then report their chat id.
/// Per-poll failures are logged and polling continues.
pub async fn find_chat_id(api_base: &str, bot_token: &str, poll_interval: Duration) -> Result<DiscoveredChat> {
    let client = Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .context("failed to build Telegram HTTP client")?;
    let url = format!("{}/bot{}/getUpdates", api_base.trim_end_matches('/'), bot_token);

    loop {
        match poll_updates(&client, &url).await {
            Ok(Some(chat)) => return Ok(chat),
            Ok(None) => tracing::debug!("no messages yet"),
            Err(e) => tracing::warn!(error = %e, "getUpdates poll failed"),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

async fn poll_updates(client: &Client, url: &str) -> Result<Option<DiscoveredChat>> {
    let resp = client.get(url).send().await.context("getUpdates request failed")?;
    let status = resp.status();
    let body = resp.text().await.context("getUpdates read failed")?;
    if !status.is_success() {
        anyhow::bail!(describe_error(status, &body));
    }
    latest_chat(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_chat_picks_last_message() {
        let body = r#"{"ok": true, "result": [
            {"update_id": 1, "message": {"chat": {"id": 111, "first_name": "Asha"}, "text": "hi"}},
            {"update_id": 2, "message": {"chat": {"id": 222, "first_name": "Ravi"}, "text": "Hello"}},
            {"update_id": 3, "edited_message": {"chat": {"id": 333}}}
        ]}"#;
        let chat = latest_chat(body).unwrap().unwrap();
        assert_eq!(chat.chat_id, 222);
        assert_eq!(chat.first_name.as_deref(), Some("Ravi"));
    }

    #[test]
    fn test_latest_chat_empty_result() {
        assert_eq!(latest_chat(r#"{"ok": true, "result": []}"#).unwrap(), None);
    }

    #[test]
    fn test_latest_chat_api_error() {
        let body = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let err = latest_chat(body).unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_describe_error_uses_description() {
        let msg = describe_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#,
        );
        assert_eq!(msg, "Telegram API error: Bad Request: chat not found (code 400)");
    }

    #[test]
    fn test_describe_error_non_json() {
        let msg = describe_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
    }

    #[test]
    fn test_method_url_trims_slash() {
        let n = TelegramNotifier::new(
            "https://api.telegram.org/",
            TelegramCredentials {
                bot_token: "123:abc".to_string(),
                chat_id: "42".to_string(),
            },
        )
        .unwrap();
        assert_eq!(n.method_url("sendMessage"), "https://api.telegram.org/bot123:abc/sendMessage");
    }

    /// Integration test: sends a real message.
    /// Run with: TELEGRAM_BOT_TOKEN=.. TELEGRAM_CHAT_ID=.. cargo test telegram_live --ignored
    #[tokio::test]
    #[ignore]
    async fn telegram_live_send() {
        let creds = TelegramCredentials {
            bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            chat_id: std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default(),
        };
        let n = TelegramNotifier::new("https://api.telegram.org", creds).unwrap();
        match n.send("job-alert test message").await {
            Ok(()) => println!("sent"),
            Err(e) => println!("send error: {:#}", e),
        }
    }
}
