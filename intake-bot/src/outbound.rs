//! Outbound replies.
//!
//! [`ReplyDispatcher`] is the only path the bot uses to talk to a chat. A
//! reply that targets an inbound message disarms that message's pending
//! deletion before the send is issued, so a message the bot answered is never
//! cleaned up afterwards.

use crate::ephemeral::EphemeralScheduler;
use crate::message::{ChatId, MessageId, SendOptions};
use crate::traits::{ChannelError, ChatTransport};
use std::sync::Arc;

/// A reply could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("Reply to chat {chat_id} failed: {source}")]
pub struct DispatchError {
    pub chat_id: ChatId,
    #[source]
    pub source: ChannelError,
}

/// Sends replies and clears pending deletions in one step.
pub struct ReplyDispatcher {
    transport: Arc<dyn ChatTransport>,
    scheduler: Arc<EphemeralScheduler>,
}

impl ReplyDispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>, scheduler: Arc<EphemeralScheduler>) -> Self {
        Self {
            transport,
            scheduler,
        }
    }

    /// Send `text` to a chat, optionally as a reply to an inbound message.
    ///
    /// When `in_reply_to` is set its pending deletion is disarmed first, even
    /// if the send then fails. Failed sends are not retried.
    pub async fn reply(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
        in_reply_to: Option<MessageId>,
    ) -> Result<MessageId, DispatchError> {
        let mut options = options;
        if let Some(message_id) = in_reply_to {
            self.scheduler.disarm(chat_id, message_id);
            options.reply_to = Some(message_id);
        }

        match self.transport.send(chat_id, text, &options).await {
            Ok(sent_id) => {
                tracing::debug!(
                    chat_id = %chat_id,
                    sent_id = %sent_id,
                    in_reply_to = ?in_reply_to.map(|m| m.0),
                    "Reply sent"
                );
                Ok(sent_id)
            }
            Err(source) => {
                tracing::error!(
                    chat_id = %chat_id,
                    channel = self.transport.name(),
                    error = %source,
                    "Failed to send reply"
                );
                Err(DispatchError { chat_id, source })
            }
        }
    }

    /// Send a message that does not answer any inbound message.
    pub async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, DispatchError> {
        self.reply(chat_id, text, options, None).await
    }

    /// Acknowledge a button press. Failures are logged and otherwise ignored.
    pub async fn acknowledge(&self, action_id: &str) {
        if let Err(e) = self.transport.acknowledge(action_id).await {
            tracing::debug!(action_id = %action_id, error = %e, "Failed to acknowledge action");
        }
    }
}
