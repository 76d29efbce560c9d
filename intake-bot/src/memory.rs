//! In-process channel for local testing.
//!
//! Records every send, delete and acknowledgement instead of talking to a
//! network service. Sends and deletes can be switched to fail.

use crate::message::{ChatId, MessageId, SendOptions};
use crate::traits::{ChannelError, ChannelResult, ChatTransport};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

/// A message recorded by [`MemoryChannel::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub options: SendOptions,
}

/// Recording transport.
pub struct MemoryChannel {
    next_id: AtomicI64,
    sent: Mutex<Vec<SentMessage>>,
    deletes: Mutex<Vec<(ChatId, MessageId)>>,
    acknowledged: Mutex<Vec<String>>,
    fail_sends: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryChannel {
    /// Create a channel whose first outgoing message id is 1000.
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            sent: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            acknowledged: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Successfully sent messages, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// The most recent successful send.
    pub fn last_sent(&self) -> Option<SentMessage> {
        lock(&self.sent).last().cloned()
    }

    /// Every delete request issued, including ones that failed.
    pub fn deletes(&self) -> Vec<(ChatId, MessageId)> {
        lock(&self.deletes).clone()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        lock(&self.acknowledged).clone()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while holding one of these locks leaves plain Vecs behind; keep using them.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl ChatTransport for MemoryChannel {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        options: &SendOptions,
    ) -> ChannelResult<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ChannelError::SendFailed("memory channel: sends disabled".into()));
        }

        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        lock(&self.sent).push(SentMessage {
            chat_id,
            message_id,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(message_id)
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> ChannelResult<()> {
        lock(&self.deletes).push((chat_id, message_id));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ChannelError::DeleteFailed(
                "Bad Request: message to delete not found".into(),
            ));
        }
        Ok(())
    }

    async fn acknowledge(&self, action_id: &str) -> ChannelResult<()> {
        lock(&self.acknowledged).push(action_id.to_string());
        Ok(())
    }
}
