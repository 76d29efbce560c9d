//! Transport traits for chat channel adapters.

use crate::message::{ChatId, MessageId, SendOptions};
use async_trait::async_trait;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel error type.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Message delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Outbound operations the bot core needs from a chat transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Get the channel name.
    fn name(&self) -> &'static str;

    /// Send a text message, returning the id the transport assigned to it.
    async fn send(&self, chat_id: ChatId, text: &str, options: &SendOptions)
        -> ChannelResult<MessageId>;

    /// Delete a message. Fails when the message is gone, too old or not ours to delete.
    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> ChannelResult<()>;

    /// Acknowledge a button press so the client stops showing a spinner.
    async fn acknowledge(&self, action_id: &str) -> ChannelResult<()>;
}
