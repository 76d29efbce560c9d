//! Telegram channel adapter.
//!
//! Implements [`ChatTransport`] against the Telegram Bot API and long-polls
//! `getUpdates`, turning each update into an [`InboundEvent`].

use crate::message::{
    ButtonAction, ChatId, EventKind, InboundEvent, InlineKeyboard, MessageId, SendOptions,
};
use crate::traits::{ChannelError, ChannelResult, ChatTransport};
use async_trait::async_trait;
use intake_common::config::{TelegramConfig, DEFAULT_API_BASE};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

// ============================================================================
// Telegram Channel
// ============================================================================

/// Telegram channel - long-polls the Bot API for updates.
pub struct TelegramChannel {
    bot_token: String,
    allowed_users: Vec<String>,
    api_base: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel.
    pub fn new(bot_token: String, allowed_users: Vec<String>) -> Self {
        Self {
            bot_token,
            allowed_users,
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: 30,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Self {
        Self::new(config.bot_token.clone(), config.allowed_users.clone())
            .with_api_base(&config.api_base)
            .with_poll_timeout(config.poll_timeout_secs)
    }

    /// Point the adapter at another Bot API server.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    fn is_user_allowed(&self, identity: &str) -> bool {
        self.allowed_users.iter().any(|u| u == "*" || u == identity)
    }

    fn is_any_user_allowed<'a, I>(&self, identities: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        identities.into_iter().any(|id| self.is_user_allowed(id))
    }

    /// Verify the bot token with `getMe`.
    pub async fn init(&self) -> ChannelResult<()> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Auth(format!("Invalid bot token: {err}")));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;
        let username = data
            .get("result")
            .and_then(|r| r.get("username"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        tracing::info!(bot = %username, "Telegram channel initialized");
        Ok(())
    }

    /// Long-poll for updates, pushing each accepted event into `tx`.
    ///
    /// Returns once the receiving side of `tx` is closed.
    pub async fn listen(&self, tx: mpsc::Sender<InboundEvent>) -> ChannelResult<()> {
        let mut offset: i64 = 0;

        tracing::info!("Telegram channel listening for updates...");

        loop {
            let body = serde_json::json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message", "callback_query"]
            });

            let resp = match self.client.post(self.api_url("getUpdates")).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Telegram poll error: {e}");
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                }
            };

            let data: Value = match resp.json().await {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Telegram parse error: {e}");
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                }
            };

            let Some(results) = data.get("result").and_then(Value::as_array) else {
                let description = data
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                tracing::warn!(description = %description, "Telegram getUpdates returned no result");
                tokio::time::sleep(POLL_BACKOFF).await;
                continue;
            };

            for update in results {
                if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                    offset = uid + 1;
                }

                let Some(event) = self.parse_update(update) else {
                    continue;
                };

                tracing::debug!(
                    chat_id = %event.chat_id,
                    message_id = %event.message_id,
                    kind = event.kind.as_str(),
                    "Telegram update received"
                );

                if tx.send(event).await.is_err() {
                    tracing::info!("Event receiver closed, Telegram listener stopping");
                    return Ok(());
                }
            }
        }
    }

    /// Convert one update into an event. Unknown shapes and updates from
    /// users outside `allowed_users` yield `None`.
    fn parse_update(&self, update: &Value) -> Option<InboundEvent> {
        if let Some(cb) = update.get("callback_query") {
            return self.parse_callback_query(cb);
        }

        let message = update.get("message")?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;
        let message_id = message.get("message_id")?.as_i64()?;

        let from = message.get("from");
        if !self.is_sender_allowed(from) {
            return None;
        }

        let kind = if let Some(text) = message.get("text").and_then(Value::as_str) {
            EventKind::Text(text.to_string())
        } else if let Some(data) = message
            .get("web_app_data")
            .and_then(|w| w.get("data"))
            .and_then(Value::as_str)
        {
            EventKind::Payload(data.to_string())
        } else {
            EventKind::Other
        };

        let author_is_system = from
            .and_then(|f| f.get("is_bot"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(InboundEvent {
            chat_id: ChatId(chat_id),
            message_id: MessageId(message_id),
            author_is_system,
            kind,
        })
    }

    fn parse_callback_query(&self, callback: &Value) -> Option<InboundEvent> {
        let id = callback.get("id")?.as_str()?;
        let data = callback.get("data").and_then(Value::as_str).unwrap_or("");

        if !self.is_sender_allowed(callback.get("from")) {
            return None;
        }

        let message = callback.get("message")?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;
        let message_id = message.get("message_id")?.as_i64()?;

        Some(InboundEvent::action(
            ChatId(chat_id),
            MessageId(message_id),
            id,
            data,
        ))
    }

    fn is_sender_allowed(&self, from: Option<&Value>) -> bool {
        let username = from
            .and_then(|f| f.get("username"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let user_id = from
            .and_then(|f| f.get("id"))
            .and_then(Value::as_i64)
            .map(|id| id.to_string());

        let mut identities = vec![username];
        if let Some(ref id) = user_id {
            identities.push(id.as_str());
        }

        if self.is_any_user_allowed(identities.iter().copied()) {
            true
        } else {
            tracing::warn!("Telegram: ignoring update from unauthorized user: {username}");
            false
        }
    }

    /// POST a Bot API method and return its `result`, mapping failures with `on_error`.
    async fn call(
        &self,
        method: &str,
        body: &Value,
        on_error: fn(String) -> ChannelError,
    ) -> ChannelResult<Value> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        let status = resp.status();
        let data: Value = resp.json().await.unwrap_or(Value::Null);

        let ok = data.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if status.is_success() && ok {
            return Ok(data.get("result").cloned().unwrap_or(Value::Null));
        }

        Err(api_error(method, status.as_u16(), &data, on_error))
    }
}

/// Map a failed Bot API call onto a channel error.
fn api_error(
    method: &str,
    status: u16,
    data: &Value,
    on_error: fn(String) -> ChannelError,
) -> ChannelError {
    if let Some(retry_after) = data
        .get("parameters")
        .and_then(|p| p.get("retry_after"))
        .and_then(Value::as_u64)
    {
        return ChannelError::RateLimited {
            retry_after_secs: retry_after,
        };
    }

    let description = data
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("no description");

    if status == 401 {
        return ChannelError::Auth(format!("{method}: {description}"));
    }

    on_error(format!("{method} failed ({status}): {description}"))
}

fn keyboard_markup(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|btn| match &btn.action {
                    ButtonAction::Callback(data) => serde_json::json!({
                        "text": btn.text,
                        "callback_data": data
                    }),
                    ButtonAction::WebApp(url) => serde_json::json!({
                        "text": btn.text,
                        "web_app": { "url": url }
                    }),
                })
                .collect()
        })
        .collect();

    serde_json::json!({ "inline_keyboard": rows })
}

#[async_trait]
impl ChatTransport for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: &SendOptions,
    ) -> ChannelResult<MessageId> {
        let mut body = serde_json::json!({
            "chat_id": chat_id.0,
            "text": text,
        });

        if let Some(mode) = options.parse_mode {
            body["parse_mode"] = Value::String(mode.as_str().to_string());
        }
        if let Some(reply_to) = options.reply_to {
            body["reply_to_message_id"] = Value::from(reply_to.0);
            body["allow_sending_without_reply"] = Value::Bool(true);
        }
        if let Some(ref keyboard) = options.keyboard {
            body["reply_markup"] = keyboard_markup(keyboard);
        }

        let result = self.call("sendMessage", &body, ChannelError::SendFailed).await?;

        result
            .get("message_id")
            .and_then(Value::as_i64)
            .map(MessageId)
            .ok_or_else(|| ChannelError::SendFailed("Missing message_id in response".into()))
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> ChannelResult<()> {
        let body = serde_json::json!({
            "chat_id": chat_id.0,
            "message_id": message_id.0
        });

        self.call("deleteMessage", &body, ChannelError::DeleteFailed)
            .await
            .map(|_| ())
    }

    async fn acknowledge(&self, action_id: &str) -> ChannelResult<()> {
        let body = serde_json::json!({ "callback_query_id": action_id });

        self.call("answerCallbackQuery", &body, ChannelError::InvalidMessage)
            .await
            .map(|_| ())
    }
}
