//! Message types exchanged between the transport and the bot core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport-assigned message identifier, unique within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound event, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    /// For actions this is the bot message that carried the button.
    pub message_id: MessageId,
    pub author_is_system: bool,
    pub kind: EventKind,
}

/// Inbound event payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Free text typed by the user
    Text(String),
    /// Button press. `id` must be acknowledged.
    Action { id: String, data: String },
    /// Data posted back by a web app
    Payload(String),
    /// Stickers, photos and anything else without a handler
    Other,
}

impl EventKind {
    /// Short label for logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Action { .. } => "action",
            Self::Payload(_) => "payload",
            Self::Other => "other",
        }
    }
}

impl InboundEvent {
    /// Text event from a user.
    pub fn text(chat_id: ChatId, message_id: MessageId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            author_is_system: false,
            kind: EventKind::Text(text.into()),
        }
    }

    /// Button press on a bot message.
    pub fn action(
        chat_id: ChatId,
        message_id: MessageId,
        id: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            author_is_system: true,
            kind: EventKind::Action {
                id: id.into(),
                data: data.into(),
            },
        }
    }

    /// Get the text content if this is a text event.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Formatting mode for outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
        }
    }
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    WebApp(String),
}

/// A single inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn web_app(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::WebApp(url.into()),
        }
    }

    /// Callback data, if this is a callback button.
    pub fn callback_data(&self) -> Option<&str> {
        match &self.action {
            ButtonAction::Callback(data) => Some(data),
            ButtonAction::WebApp(_) => None,
        }
    }
}

/// Rows of inline buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Lay buttons out `per_row` to a row, the last row possibly shorter.
    pub fn grid(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let mut rows = Vec::new();
        let mut row = Vec::with_capacity(per_row);
        for button in buttons {
            row.push(button);
            if row.len() == per_row.max(1) {
                rows.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        Self { rows }
    }

    pub fn push_row(mut self, row: Vec<InlineButton>) -> Self {
        self.rows.push(row);
        self
    }

    /// Every callback data value, in layout order.
    pub fn callback_data(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .filter_map(InlineButton::callback_data)
            .collect()
    }
}

/// Transport options for one outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub keyboard: Option<InlineKeyboard>,
    pub reply_to: Option<MessageId>,
}

impl SendOptions {
    pub fn html() -> Self {
        Self {
            parse_mode: Some(ParseMode::Html),
            ..Self::default()
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
