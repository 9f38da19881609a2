//! # Telegram Service Adapter
//!
//! Thin client for the Telegram Bot API plus the `ChatProvider` implementation bound to a single chat.
//! Wire types mirror the Bot API JSON; only the fields the bot reads are declared.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::config::TelegramConfig;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Button, Event, IncomingCallback, IncomingMessage, Keyboard, Reply};

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl Update {
    /// Converts the wire update into a routable event.
    /// Updates the bot does not act on (channel posts, inline callbacks, ...) yield `None`.
    pub fn into_event(self) -> Option<Event> {
        if let Some(query) = self.callback_query {
            let message = query.message?;
            return Some(Event::Callback(IncomingCallback {
                id: query.id,
                user_id: query.from.id,
                chat_id: message.chat.id,
                message_id: message.message_id,
                data: query.data,
            }));
        }

        let message = self.message?;
        let from = message.from?;
        Some(Event::Message(IncomingMessage {
            user_id: from.id,
            first_name: from.first_name,
            chat_id: message.chat.id,
            text: message.text,
        }))
    }
}

/// Serializes a `Reply` into `sendMessage` / `editMessageText` fields.
fn reply_fields(reply: &Reply) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    fields.insert("text".into(), Value::String(reply.text.clone()));
    if reply.markdown {
        fields.insert("parse_mode".into(), json!("Markdown"));
    }
    if let Some(keyboard) = &reply.keyboard {
        fields.insert("reply_markup".into(), keyboard_markup(keyboard));
    }
    if reply.disable_preview {
        fields.insert("disable_web_page_preview".into(), Value::Bool(true));
    }
    fields
}

fn keyboard_markup(keyboard: &Keyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match button {
                    Button::Callback { text, data } => {
                        json!({ "text": text, "callback_data": data })
                    }
                    Button::Url { text, url } => json!({ "text": text, "url": url }),
                })
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

/// Bot API client. Cheap to share behind an `Arc`.
pub struct TelegramApi {
    http: Client,
    base: String,
    timeout: Duration,
}

pub type SharedTelegramApi = Arc<TelegramApi>;

impl TelegramApi {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", config.api_url, config.token),
            timeout: config.timeout,
        })
    }

    async fn call<T, P>(&self, method: &str, payload: &P, timeout: Duration) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.base, method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| anyhow!("{method} failed: {}", e.without_url()))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| {
                anyhow!(
                    "{method} returned unreadable body ({status}): {}",
                    e.without_url()
                )
            })?;

        if !envelope.ok {
            return Err(anyhow!(
                "{method} rejected ({status}): {}",
                envelope.description.unwrap_or_default()
            ));
        }
        envelope
            .result
            .ok_or_else(|| anyhow!("{method} returned no result"))
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({}), self.timeout).await
    }

    /// Long poll. The request timeout is stretched past the server-side wait.
    pub async fn get_updates(&self, offset: i64, wait_secs: u64) -> Result<Vec<Update>> {
        let payload = json!({
            "offset": offset,
            "timeout": wait_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call(
            "getUpdates",
            &payload,
            self.timeout + Duration::from_secs(wait_secs),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, reply: &Reply) -> Result<i64> {
        let mut payload = reply_fields(reply);
        payload.insert("chat_id".into(), json!(chat_id));
        let sent: SentMessage = self.call("sendMessage", &payload, self.timeout).await?;
        Ok(sent.message_id)
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        reply: &Reply,
    ) -> Result<()> {
        let mut payload = reply_fields(reply);
        payload.insert("chat_id".into(), json!(chat_id));
        payload.insert("message_id".into(), json!(message_id));
        // Returns the edited Message, or `true` for inline messages.
        let _: Value = self.call("editMessageText", &payload, self.timeout).await?;
        Ok(())
    }

    pub async fn answer_callback_query(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<()> {
        let mut payload = json!({ "callback_query_id": callback_id });
        if let Some(text) = alert {
            payload["text"] = json!(text);
            payload["show_alert"] = json!(true);
        }
        let _: bool = self
            .call("answerCallbackQuery", &payload, self.timeout)
            .await?;
        Ok(())
    }

    pub async fn set_webhook(&self, url: &str) -> Result<bool> {
        let payload = json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
            "drop_pending_updates": false,
        });
        self.call("setWebhook", &payload, self.timeout).await
    }

    pub async fn delete_webhook(&self, drop_pending: bool) -> Result<bool> {
        let payload = json!({ "drop_pending_updates": drop_pending });
        self.call("deleteWebhook", &payload, self.timeout).await
    }

    pub async fn get_webhook_info(&self) -> Result<Value> {
        self.call("getWebhookInfo", &json!({}), self.timeout).await
    }
}

/// `ChatProvider` for one Telegram chat.
#[derive(Clone)]
pub struct TelegramChat {
    api: SharedTelegramApi,
    chat_id: i64,
}

impl TelegramChat {
    pub fn new(api: SharedTelegramApi, chat_id: i64) -> Self {
        Self { api, chat_id }
    }
}

#[async_trait]
impl ChatProvider for TelegramChat {
    fn chat_id(&self) -> i64 {
        self.chat_id
    }

    async fn send(&self, reply: Reply) -> Result<i64, String> {
        tracing::debug!("Bot sending message to {}: {}", self.chat_id, reply.text);
        self.api
            .send_message(self.chat_id, &reply)
            .await
            .map_err(|e| e.to_string())
    }

    async fn edit(&self, message_id: i64, reply: Reply) -> Result<(), String> {
        self.api
            .edit_message_text(self.chat_id, message_id, &reply)
            .await
            .map_err(|e| e.to_string())
    }

    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<(), String> {
        self.api
            .answer_callback_query(callback_id, alert)
            .await
            .map_err(|e| e.to_string())
    }
}
