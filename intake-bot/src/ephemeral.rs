//! Self-cleaning chats: delayed deletion of unanswered inbound messages.
//!
//! Every user message is armed for deletion when it arrives. Replying to it
//! through the [`ReplyDispatcher`](crate::outbound::ReplyDispatcher) disarms it,
//! so only messages the bot never answered disappear.
//!
//! The registry maps each `(chat, message)` key to the handle of its timer
//! task. Re-arming a key cancels the previous timer, and a timer only deletes
//! if it is still the one registered for its key when it fires, so at most one
//! deletion is ever in flight per key.

use crate::message::{ChatId, MessageId};
use crate::traits::ChatTransport;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Delay used when none is configured.
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_secs(30);

/// Registry key of one pending deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingKey {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Cancellation handle for one armed timer.
#[derive(Debug)]
pub struct DeletionHandle {
    generation: u64,
    abort: AbortHandle,
}

impl DeletionHandle {
    /// Stop the timer. Consumes the handle.
    pub fn cancel(self) {
        self.abort.abort();
    }
}

/// A scheduled deletion.
#[derive(Debug)]
pub struct PendingDeletion {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub armed_at: Instant,
    pub deadline: Instant,
    handle: DeletionHandle,
}

/// Arms and disarms delayed deletions.
pub struct EphemeralScheduler {
    transport: Arc<dyn ChatTransport>,
    delay: Duration,
    enabled: bool,
    pending: Arc<DashMap<PendingKey, PendingDeletion>>,
    next_generation: AtomicU64,
}

impl EphemeralScheduler {
    /// Create a scheduler deleting unanswered messages after `delay`.
    pub fn new(transport: Arc<dyn ChatTransport>, delay: Duration) -> Self {
        Self {
            transport,
            delay,
            enabled: true,
            pending: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Turn arming on or off. A disabled scheduler never deletes anything.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule deletion of a message. Returns whether a timer was started.
    ///
    /// Messages authored by the bot are never armed. Arming a key that is
    /// already armed replaces its timer.
    pub fn arm(&self, chat_id: ChatId, message_id: MessageId, source_is_system: bool) -> bool {
        if source_is_system || !self.enabled {
            return false;
        }

        let key = PendingKey {
            chat_id,
            message_id,
        };
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let armed_at = Instant::now();
        let deadline = armed_at + self.delay;

        let task = tokio::spawn(fire(
            Arc::clone(&self.pending),
            Arc::clone(&self.transport),
            key,
            generation,
            deadline,
        ));

        let entry = PendingDeletion {
            chat_id,
            message_id,
            armed_at,
            deadline,
            handle: DeletionHandle {
                generation,
                abort: task.abort_handle(),
            },
        };

        if let Some(previous) = self.pending.insert(key, entry) {
            previous.handle.cancel();
            tracing::debug!(
                chat_id = %chat_id,
                message_id = %message_id,
                "Re-armed pending deletion"
            );
        } else {
            tracing::debug!(
                chat_id = %chat_id,
                message_id = %message_id,
                delay_ms = self.delay.as_millis() as u64,
                "Armed pending deletion"
            );
        }

        true
    }

    /// Cancel a scheduled deletion. Returns whether one was pending.
    ///
    /// Safe to call for keys that were never armed.
    pub fn disarm(&self, chat_id: ChatId, message_id: MessageId) -> bool {
        let key = PendingKey {
            chat_id,
            message_id,
        };

        match self.pending.remove(&key) {
            Some((_, pending)) => {
                pending.handle.cancel();
                tracing::debug!(
                    chat_id = %chat_id,
                    message_id = %message_id,
                    "Disarmed pending deletion"
                );
                true
            }
            None => false,
        }
    }

    /// Whether a deletion is pending for the message.
    pub fn is_armed(&self, chat_id: ChatId, message_id: MessageId) -> bool {
        self.pending.contains_key(&PendingKey {
            chat_id,
            message_id,
        })
    }

    /// When the pending deletion for the message fires.
    pub fn deadline(&self, chat_id: ChatId, message_id: MessageId) -> Option<Instant> {
        self.pending
            .get(&PendingKey {
                chat_id,
                message_id,
            })
            .map(|p| p.deadline)
    }

    /// Number of live timers.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every pending deletion (used on shutdown).
    pub fn disarm_all(&self) -> usize {
        let keys: Vec<PendingKey> = self.pending.iter().map(|e| *e.key()).collect();
        keys.into_iter()
            .filter(|k| self.disarm(k.chat_id, k.message_id))
            .count()
    }
}

impl Drop for EphemeralScheduler {
    fn drop(&mut self) {
        for entry in self.pending.iter() {
            entry.handle.abort.abort();
        }
    }
}

async fn fire(
    pending: Arc<DashMap<PendingKey, PendingDeletion>>,
    transport: Arc<dyn ChatTransport>,
    key: PendingKey,
    generation: u64,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;

    // A reply or re-arm may have replaced us while we slept.
    let still_current = pending
        .remove_if(&key, |_, p| p.handle.generation == generation)
        .is_some();
    if !still_current {
        return;
    }

    match transport.delete(key.chat_id, key.message_id).await {
        Ok(()) => tracing::debug!(
            chat_id = %key.chat_id,
            message_id = %key.message_id,
            "Deleted unanswered message"
        ),
        Err(e) => tracing::debug!(
            chat_id = %key.chat_id,
            message_id = %key.message_id,
            error = %e,
            "Ignoring failed delete of unanswered message"
        ),
    }
}
