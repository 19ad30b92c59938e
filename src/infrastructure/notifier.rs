//! Telegram alerts - one message per completed triangle.
//!
//! Enabled only when both the bot token and the chat id are configured.
//! Alert delivery is best-effort: failures are logged and swallowed, never
//! propagated into the trading path.

use reqwest::Client;
use serde_json::json;
use tracing::warn;

pub struct TelegramNotifier {
    http_client: Client,
    auth: Option<(String, String)>, // (bot_token, chat_id)
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        let auth = match (bot_token, chat_id) {
            (Some(token), Some(chat)) => Some((token, chat)),
            _ => None,
        };
        Self {
            http_client: Client::new(),
            auth,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.auth.is_some()
    }

    /// Send one HTML-formatted message.
    pub async fn send_alert(&self, message: &str) {
        let Some((token, chat_id)) = &self.auth else {
            return;
        };
        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let body = json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        match self.http_client.post(&url).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!("Telegram alert returned {}", response.status());
            }
            Ok(_) => {}
            Err(err) => warn!("Telegram alert failed: {err}"),
        }
    }
}
