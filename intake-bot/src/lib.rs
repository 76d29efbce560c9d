//! Intake Bot - Telegram registration bot with self-cleaning chats.
//!
//! The bot walks a user through a short registration form (bank, account
//! name, account number, confirmation) and keeps the chat tidy: every inbound
//! message is deleted after a delay unless the bot replies to it first.
//!
//! ## Architecture
//!
//! ```text
//! Telegram ─getUpdates─▶ TelegramChannel ─mpsc─▶ BotHandler ──▶ SessionStore
//!                                                   │  │          + intake::advance
//!                              EphemeralScheduler ◀─┘  ├────────▶ RecordRegistry
//!                                      ▲               ▼
//! Telegram ◀─sendMessage/deleteMessage─┴──── ReplyDispatcher
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod ephemeral;
pub mod handler;
pub mod intake;
pub mod memory;
pub mod message;
pub mod outbound;
pub mod registry;
pub mod session;
pub mod telegram;
pub mod traits;

// Re-export commonly used types
pub use ephemeral::{EphemeralScheduler, PendingDeletion, DEFAULT_DELETE_DELAY};
pub use handler::{load_welcome_text, BotHandler};
pub use intake::{advance, FieldError, Input, Step, Submission, Transition};
pub use memory::{MemoryChannel, SentMessage};
pub use message::{
    ButtonAction, ChatId, EventKind, InboundEvent, InlineButton, InlineKeyboard, MessageId,
    ParseMode, SendOptions,
};
pub use outbound::{DispatchError, ReplyDispatcher};
pub use registry::{JsonFileRegistry, MemoryRegistry, Record, RecordRegistry, RegistryError};
pub use session::{Draft, Session, SessionStore};
pub use telegram::TelegramChannel;
pub use traits::{ChannelError, ChannelResult, ChatTransport};

use anyhow::Context;
use intake_common::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// How often idle sessions are swept when a session TTL is configured.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const EVENT_QUEUE_CAPACITY: usize = 256;

/// Feed events to the handler one at a time until the sender side closes.
///
/// With `sweep_every` set, idle sessions are evicted on that interval
/// between events.
pub async fn run_event_loop(
    mut handler: BotHandler,
    mut rx: mpsc::Receiver<InboundEvent>,
    sweep_every: Option<Duration>,
) {
    let mut sweep = tokio::time::interval(sweep_every.unwrap_or(SESSION_SWEEP_INTERVAL));
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => handler.handle(event).await,
                None => break,
            },
            _ = sweep.tick(), if sweep_every.is_some() => {
                handler.evict_idle_sessions();
            }
        }
    }

    tracing::info!("Event stream closed");
}

/// Wire up the Telegram channel, registry and handler, then run until Ctrl-C.
pub async fn start_bot(config: &Config) -> anyhow::Result<()> {
    let delay = config
        .ephemeral
        .delete_delay()
        .map_err(|e| anyhow::anyhow!("Invalid ephemeral.delete_delay: {e}"))?;

    let telegram = Arc::new(TelegramChannel::from_config(&config.telegram));
    telegram
        .init()
        .await
        .context("Telegram bot token check failed")?;

    let transport: Arc<dyn ChatTransport> = telegram.clone();
    let scheduler = Arc::new(
        EphemeralScheduler::new(transport.clone(), delay).with_enabled(config.ephemeral.enabled),
    );
    let dispatcher = ReplyDispatcher::new(transport, scheduler.clone());
    let registry = JsonFileRegistry::open(config.intake.registry_path());
    let handler = BotHandler::new(dispatcher, scheduler.clone(), Box::new(registry), &config.intake);

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let listener = tokio::spawn(async move {
        if let Err(e) = telegram.listen(tx).await {
            tracing::error!(error = %e, "Telegram listener stopped");
        }
    });

    let sweep_every = config
        .intake
        .session_idle_ttl()
        .map(|_| SESSION_SWEEP_INTERVAL);

    tracing::info!(
        delete_delay_secs = delay.as_secs(),
        ephemeral = config.ephemeral.enabled,
        session_idle_ttl_secs = ?config.intake.session_idle_ttl_secs,
        "Intake bot started"
    );

    tokio::select! {
        () = run_event_loop(handler, rx, sweep_every) => {
            tracing::warn!("Telegram listener ended, shutting down");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        }
    }

    listener.abort();
    let dropped = scheduler.disarm_all();
    tracing::info!(pending_deletions = dropped, "Intake bot stopped");

    Ok(())
}
