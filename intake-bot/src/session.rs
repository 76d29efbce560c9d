//! In-memory registration sessions, one per chat.
//!
//! Sessions live until the flow completes, is cancelled, or is overwritten by
//! a new flow. An optional idle TTL reclaims abandoned sessions; without one
//! (the default) an abandoned session stays until the process restarts.

use crate::intake::Step;
use crate::message::ChatId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Answers collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub bank: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
}

/// An in-progress registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub step: Step,
    pub data: Draft,
    pub last_activity: Instant,
}

impl Session {
    /// A fresh session at the given step.
    pub fn new(step: Step) -> Self {
        Self {
            step,
            data: Draft::default(),
            last_activity: Instant::now(),
        }
    }

    fn is_idle(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity) >= ttl
    }
}

/// Keyed table of sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ChatId, Session>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict sessions idle for at least `ttl`. `None` disables eviction.
    pub fn with_idle_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.idle_ttl = ttl;
        self
    }

    /// Look up the session for a chat, dropping it first if it went idle.
    pub fn get(&mut self, chat_id: ChatId) -> Option<&Session> {
        if let Some(ttl) = self.idle_ttl {
            let now = Instant::now();
            if self.sessions.get(&chat_id).is_some_and(|s| s.is_idle(ttl, now)) {
                self.sessions.remove(&chat_id);
                tracing::info!(chat_id = %chat_id, "Evicted idle session on access");
                return None;
            }
        }
        self.sessions.get(&chat_id)
    }

    /// Store a session, replacing any previous one for the chat.
    pub fn set(&mut self, chat_id: ChatId, mut session: Session) -> Option<Session> {
        session.last_activity = Instant::now();
        self.sessions.insert(chat_id, session)
    }

    /// Record activity on a session without changing it.
    ///
    /// Returns false when the chat has no session.
    pub fn touch(&mut self, chat_id: ChatId) -> bool {
        match self.sessions.get_mut(&chat_id) {
            Some(session) => {
                session.last_activity = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Remove the session for a chat.
    pub fn delete(&mut self, chat_id: ChatId) -> Option<Session> {
        self.sessions.remove(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sweep out idle sessions. Returns how many were removed.
    pub fn evict_idle(&mut self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_idle(ttl, now));

        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(removed = removed, "Evicted idle sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_replaces_existing_session() {
        let mut store = SessionStore::new();
        store.set(ChatId(1), Session::new(Step::ChooseCategory));
        let previous = store.set(ChatId(1), Session::new(Step::EnterName));

        assert_eq!(previous.map(|s| s.step), Some(Step::ChooseCategory));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ChatId(1)).map(|s| s.step), Some(Step::EnterName));
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let mut store = SessionStore::new();
        store.set(ChatId(1), Session::new(Step::ChooseCategory));

        assert!(store.delete(ChatId(1)).is_some());
        assert!(store.delete(ChatId(1)).is_none());
        assert!(store.get(ChatId(1)).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_never_expire_without_ttl() {
        let mut store = SessionStore::new();
        store.set(ChatId(1), Session::new(Step::EnterName));

        tokio::time::sleep(Duration::from_secs(86_400 * 30)).await;
        assert_eq!(store.evict_idle(), 0);
        assert!(store.get(ChatId(1)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_is_evicted_lazily() {
        let mut store = SessionStore::new().with_idle_ttl(Some(Duration::from_secs(600)));
        store.set(ChatId(1), Session::new(Step::EnterName));

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(store.get(ChatId(1)).is_some());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(store.get(ChatId(1)).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_keeps_recently_touched_sessions() {
        let mut store = SessionStore::new().with_idle_ttl(Some(Duration::from_secs(600)));
        store.set(ChatId(1), Session::new(Step::EnterName));
        store.set(ChatId(2), Session::new(Step::EnterName));

        tokio::time::sleep(Duration::from_secs(500)).await;
        let touched = store.get(ChatId(2)).cloned().unwrap();
        store.set(ChatId(2), touched);

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(store.evict_idle(), 1);
        assert!(store.get(ChatId(2)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn touch_postpones_eviction() {
        let mut store = SessionStore::new().with_idle_ttl(Some(Duration::from_secs(600)));
        store.set(ChatId(1), Session::new(Step::EnterName));

        tokio::time::sleep(Duration::from_secs(500)).await;
        assert!(store.touch(ChatId(1)));
        assert!(!store.touch(ChatId(2)));

        tokio::time::sleep(Duration::from_secs(500)).await;
        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.get(ChatId(1)).map(|s| s.step), Some(Step::EnterName));
    }
}
