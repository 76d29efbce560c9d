//! End-to-end tests for the registration flow and message cleanup.
//!
//! Everything runs against the in-memory channel and registry on tokio's
//! paused clock, so deletion timers fire deterministically.

use intake_bot::intake::prompts::actions;
use intake_bot::{
    run_event_loop, BotHandler, ChatId, EphemeralScheduler, InboundEvent, MemoryChannel,
    MemoryRegistry, MessageId, Record, RecordRegistry, ReplyDispatcher, Step,
};
use intake_common::config::IntakeConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const CHAT: ChatId = ChatId(4242);
const DELAY: Duration = Duration::from_secs(30);

/// Test helper wiring a handler to an in-memory channel.
fn create_bot(registry: MemoryRegistry) -> (Arc<MemoryChannel>, Arc<EphemeralScheduler>, BotHandler) {
    let channel = Arc::new(MemoryChannel::new());
    let scheduler = Arc::new(EphemeralScheduler::new(channel.clone(), DELAY));
    let dispatcher = ReplyDispatcher::new(channel.clone(), scheduler.clone());
    let handler = BotHandler::new(
        dispatcher,
        scheduler.clone(),
        Box::new(registry),
        &IntakeConfig::default(),
    )
    .with_welcome_text("Halo! Selamat datang.");
    (channel, scheduler, handler)
}

fn press(message_id: i64, data: &str) -> InboundEvent {
    InboundEvent::action(CHAT, MessageId(message_id), format!("cb-{message_id}"), data)
}

fn say(message_id: i64, text: &str) -> InboundEvent {
    InboundEvent::text(CHAT, MessageId(message_id), text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_full_registration_with_bca() {
    let (channel, scheduler, mut handler) = create_bot(MemoryRegistry::new());

    handler.handle(say(1, "/start")).await;
    handler.handle(press(1000, actions::REGISTER)).await;
    assert_eq!(handler.session(CHAT).map(|s| s.step), Some(Step::ChooseCategory));

    handler.handle(press(1001, "bank:BCA")).await;
    assert_eq!(handler.session(CHAT).map(|s| s.step), Some(Step::EnterName));

    handler.handle(say(2, "123")).await;
    assert_eq!(handler.session(CHAT).map(|s| s.step), Some(Step::EnterName));
    assert!(channel.last_sent().unwrap().text.contains("Nama tidak valid"));

    handler.handle(say(3, "Agus Budiman")).await;
    assert_eq!(
        handler.session(CHAT).map(|s| s.step),
        Some(Step::EnterAccountNumber)
    );

    handler.handle(say(4, "1234567890")).await;
    assert_eq!(handler.session(CHAT).map(|s| s.step), Some(Step::Confirm));

    let summary = channel.last_sent().unwrap();
    assert!(summary.text.contains("BCA"));
    assert!(summary.text.contains("Agus Budiman"));
    assert!(summary.text.contains("1234567890"));

    handler.handle(press(summary.message_id.0, actions::CONFIRM)).await;

    assert!(handler.session(CHAT).is_none());
    let record = handler.registry().get(CHAT).expect("record committed");
    assert_eq!(record.bank, "BCA");
    assert_eq!(record.account_name, "Agus Budiman");
    assert_eq!(record.account_number, "1234567890");
    assert_eq!(record.balance, 0);

    let sent = channel.sent();
    let tail: Vec<&str> = sent[sent.len() - 2..].iter().map(|m| m.text.as_str()).collect();
    assert!(tail[0].contains("Pendaftaran Berhasil"));
    assert!(tail[1].contains("Dashboard"));

    // Every user message was answered, so nothing gets cleaned up.
    tokio::time::sleep(DELAY * 2).await;
    assert!(channel.deletes().is_empty());
    assert_eq!(scheduler.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_already_registered_skips_the_form() {
    let mut registry = MemoryRegistry::new();
    registry
        .put(
            CHAT,
            Record {
                bank: "BRI".into(),
                account_name: "Siti".into(),
                account_number: "987654".into(),
                balance: 1_250_000,
                registered_at: None,
            },
        )
        .unwrap();
    let (channel, _scheduler, mut handler) = create_bot(registry);

    handler.handle(press(1000, actions::REGISTER)).await;

    assert!(handler.session(CHAT).is_none());
    let sent = channel.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].text.contains("sudah terdaftar"));
    assert!(sent[1].text.contains("Rp 1.250.000"));
}

#[tokio::test(start_paused = true)]
async fn test_one_session_per_chat() {
    let (_channel, _scheduler, mut handler) = create_bot(MemoryRegistry::new());

    handler.handle(press(1000, actions::REGISTER)).await;
    handler.handle(press(1001, "bank:DANA")).await;
    handler.handle(say(1, "Budi")).await;

    // Pressing Daftar again restarts rather than adding a second session.
    handler.handle(press(1002, actions::REGISTER)).await;

    let session = handler.session(CHAT).unwrap();
    assert_eq!(session.step, Step::ChooseCategory);
    assert_eq!(session.data.bank, None);
}

#[tokio::test(start_paused = true)]
async fn test_chats_do_not_share_sessions() {
    let (_channel, _scheduler, mut handler) = create_bot(MemoryRegistry::new());
    let other = ChatId(7);

    handler.handle(press(1000, actions::REGISTER)).await;
    handler
        .handle(InboundEvent::action(other, MessageId(1), "cb-x", "bank:BCA"))
        .await;

    assert_eq!(handler.session(CHAT).map(|s| s.step), Some(Step::ChooseCategory));
    assert!(handler.session(other).is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Message cleanup
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_unanswered_message_deleted_once() {
    let (channel, _scheduler, mut handler) = create_bot(MemoryRegistry::new());

    handler.handle(say(77, "halo?")).await;
    assert!(channel.sent().is_empty());

    tokio::time::sleep(DELAY - Duration::from_secs(1)).await;
    assert!(channel.deletes().is_empty());

    tokio::time::sleep(DELAY * 3).await;
    assert_eq!(channel.deletes(), vec![(CHAT, MessageId(77))]);
}

#[tokio::test(start_paused = true)]
async fn test_reply_prevents_deletion() {
    let (channel, scheduler, mut handler) = create_bot(MemoryRegistry::new());

    handler.handle(press(1000, actions::REGISTER)).await;
    handler.handle(press(1001, "bank:BCA")).await;

    handler.handle(say(5, "Agus Budiman")).await;
    assert!(!scheduler.is_armed(CHAT, MessageId(5)));
    assert_eq!(channel.last_sent().unwrap().options.reply_to, Some(MessageId(5)));

    tokio::time::sleep(DELAY * 3).await;
    assert!(channel.deletes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rearmed_message_deleted_once() {
    let (channel, scheduler, mut handler) = create_bot(MemoryRegistry::new());

    handler.handle(say(9, "halo")).await;
    tokio::time::sleep(Duration::from_secs(20)).await;
    handler.handle(say(9, "halo")).await;
    assert_eq!(scheduler.pending_count(), 1);

    // First deadline passes without a delete: the timer was replaced.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(channel.deletes().is_empty());

    tokio::time::sleep(DELAY).await;
    assert_eq!(channel.deletes(), vec![(CHAT, MessageId(9))]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_is_swallowed() {
    let (channel, scheduler, mut handler) = create_bot(MemoryRegistry::new());
    channel.set_fail_deletes(true);

    handler.handle(say(1, "satu")).await;
    handler.handle(say(2, "dua")).await;
    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(channel.deletes().len(), 2);
    assert_eq!(scheduler.pending_count(), 0);

    // The bot keeps working afterwards.
    handler.handle(say(3, "/start")).await;
    assert_eq!(channel.last_sent().unwrap().options.reply_to, Some(MessageId(3)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Event loop
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_event_loop_processes_in_order_until_closed() {
    let (channel, _scheduler, handler) = create_bot(MemoryRegistry::new());
    let (tx, rx) = mpsc::channel(16);

    let worker = tokio::spawn(run_event_loop(handler, rx, Some(Duration::from_secs(60))));

    tx.send(say(1, "/start")).await.unwrap();
    tx.send(press(1000, actions::REGISTER)).await.unwrap();
    tx.send(press(1001, "bank:BNI")).await.unwrap();
    tx.send(say(2, "Agus Budiman")).await.unwrap();
    drop(tx);

    worker.await.unwrap();

    let replies: Vec<Option<MessageId>> = channel.sent().iter().map(|m| m.options.reply_to).collect();
    assert_eq!(
        replies,
        vec![
            Some(MessageId(1)),
            Some(MessageId(1000)),
            Some(MessageId(1001)),
            Some(MessageId(2)),
        ]
    );
    assert_eq!(channel.acknowledged(), vec!["cb-1000", "cb-1001"]);
}
