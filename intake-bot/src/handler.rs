//! Inbound event handling.
//!
//! [`BotHandler`] is the pipeline every inbound event goes through, strictly
//! one at a time:
//!
//! 1. Arm deletion of the inbound message.
//! 2. Route it: `/start`, free text for the registration flow, web-app data,
//!    or a button press.
//! 3. Reply through the [`ReplyDispatcher`], which disarms the message again.
//!
//! The handler owns the session store and the record registry outright, so
//! neither needs a lock.

use crate::ephemeral::EphemeralScheduler;
use crate::intake::prompts::{self, actions, Prompt};
use crate::intake::{self, Input, Step, Submission, Transition};
use crate::message::{ChatId, EventKind, InboundEvent, MessageId};
use crate::outbound::ReplyDispatcher;
use crate::registry::{Record, RecordRegistry};
use crate::session::{Session, SessionStore};
use intake_common::config::IntakeConfig;
use intake_common::logging::generate_trace_id;
use intake_common::util::truncate_with_ellipsis;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::Instrument;

/// `/start`, `/start@bot_name`, optionally followed by arguments.
static START_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/start(@\w+)?(\s|$)").unwrap());

const LOG_PREVIEW_CHARS: usize = 64;

/// Read the `/start` greeting, falling back to the built-in one.
pub fn load_welcome_text(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return prompts::DEFAULT_WELCOME.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Welcome text file is empty, using default greeting");
            prompts::DEFAULT_WELCOME.to_string()
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read welcome text, using default greeting"
            );
            prompts::DEFAULT_WELCOME.to_string()
        }
    }
}

/// Routes inbound events through the registration flow.
pub struct BotHandler {
    dispatcher: ReplyDispatcher,
    scheduler: Arc<EphemeralScheduler>,
    sessions: SessionStore,
    registry: Box<dyn RecordRegistry>,
    form_title: String,
    banks: Vec<String>,
    profile_banks: Vec<String>,
    welcome_text: String,
}

impl BotHandler {
    pub fn new(
        dispatcher: ReplyDispatcher,
        scheduler: Arc<EphemeralScheduler>,
        registry: Box<dyn RecordRegistry>,
        config: &IntakeConfig,
    ) -> Self {
        Self {
            dispatcher,
            scheduler,
            sessions: SessionStore::new().with_idle_ttl(config.session_idle_ttl()),
            registry,
            form_title: config.form_title.clone(),
            banks: config.banks.clone(),
            profile_banks: config.profile_banks.clone(),
            welcome_text: load_welcome_text(config.welcome_text_path.as_deref()),
        }
    }

    /// Override the `/start` greeting.
    pub fn with_welcome_text(mut self, text: impl Into<String>) -> Self {
        self.welcome_text = text.into();
        self
    }

    /// Current session for a chat.
    pub fn session(&mut self, chat_id: ChatId) -> Option<&Session> {
        self.sessions.get(chat_id)
    }

    pub fn registry(&self) -> &dyn RecordRegistry {
        self.registry.as_ref()
    }

    /// Drop sessions that have been idle past the configured TTL.
    pub fn evict_idle_sessions(&mut self) -> usize {
        self.sessions.evict_idle()
    }

    /// Handle one inbound event.
    pub async fn handle(&mut self, event: InboundEvent) {
        let span = tracing::info_span!(
            "inbound_event",
            trace_id = %generate_trace_id(),
            chat_id = %event.chat_id,
            message_id = %event.message_id,
            kind = event.kind.as_str()
        );

        self.process(event).instrument(span).await;
    }

    async fn process(&mut self, event: InboundEvent) {
        let InboundEvent {
            chat_id,
            message_id,
            author_is_system,
            kind,
        } = event;

        self.scheduler.arm(chat_id, message_id, author_is_system);

        match kind {
            EventKind::Text(text) => self.on_text(chat_id, message_id, &text).await,
            EventKind::Action { id, data } => {
                self.dispatcher.acknowledge(&id).await;
                self.on_action(chat_id, message_id, &data).await;
            }
            EventKind::Payload(data) => {
                tracing::info!(
                    data = %truncate_with_ellipsis(&data, LOG_PREVIEW_CHARS),
                    "Web app data received"
                );
                self.reply(chat_id, message_id, prompts::web_app_data(&data)).await;
            }
            EventKind::Other => {
                tracing::debug!("Unhandled message left for deletion");
            }
        }
    }

    async fn on_text(&mut self, chat_id: ChatId, message_id: MessageId, text: &str) {
        let trimmed = text.trim();

        if trimmed.starts_with('/') {
            if START_COMMAND.is_match(trimmed) {
                let prompt = prompts::welcome(&self.welcome_text);
                self.reply(chat_id, message_id, prompt).await;
            } else {
                tracing::debug!(
                    command = %truncate_with_ellipsis(trimmed, LOG_PREVIEW_CHARS),
                    "Ignoring unknown command"
                );
            }
            return;
        }

        let transition = match self.sessions.get(chat_id) {
            Some(session) if session.step.accepts_text() => {
                intake::advance(session, Input::Text(text))
            }
            Some(session) => {
                tracing::debug!(step = session.step.as_str(), "Text ignored at a button step");
                self.sessions.touch(chat_id);
                return;
            }
            None => return,
        };

        self.apply(chat_id, message_id, transition).await;
    }

    async fn on_action(&mut self, chat_id: ChatId, message_id: MessageId, data: &str) {
        if let Some(bank) = data.strip_prefix(actions::BANK_PREFIX) {
            self.select_category(chat_id, message_id, bank).await;
            return;
        }

        match data {
            actions::REGISTER => self.start_registration(chat_id, message_id).await,
            actions::CONFIRM => self.confirm(chat_id, message_id).await,
            actions::CANCEL => {
                let transition = self
                    .sessions
                    .get(chat_id)
                    .map_or(Transition::Cancelled, |session| {
                        intake::advance(session, Input::Cancel)
                    });
                self.apply(chat_id, message_id, transition).await;
            }
            actions::LOGIN => {
                self.reply(chat_id, message_id, prompts::login_unavailable()).await;
            }
            actions::CANCEL_LOGIN => {
                self.reply(chat_id, message_id, prompts::login_cancelled()).await;
            }
            actions::OPEN_DASHBOARD
            | actions::VIEW_DASHBOARD
            | actions::DEPOSIT
            | actions::WITHDRAW
            | actions::BUY
            | actions::UPDATE_PROFILE => self.member_action(chat_id, message_id, data).await,
            other => {
                tracing::debug!(
                    action = %truncate_with_ellipsis(other, LOG_PREVIEW_CHARS),
                    "Unknown action"
                );
                self.reply(chat_id, message_id, prompts::unknown_action()).await;
            }
        }
    }

    /// Open the form, or show the dashboard when the chat is already registered.
    async fn start_registration(&mut self, chat_id: ChatId, message_id: MessageId) {
        if let Some(record) = self.registry.get(chat_id) {
            tracing::info!("Already registered, opening dashboard");
            if self.reply(chat_id, message_id, prompts::already_registered()).await {
                self.send(chat_id, prompts::dashboard(&record)).await;
            }
            return;
        }

        let prompt = prompts::bank_menu(&self.form_title, &self.banks);
        if self.reply(chat_id, message_id, prompt).await {
            self.sessions.set(chat_id, Session::new(Step::ChooseCategory));
            tracing::info!("Registration started");
        }
    }

    async fn select_category(&mut self, chat_id: ChatId, message_id: MessageId, bank: &str) {
        let transition = self
            .sessions
            .get(chat_id)
            .filter(|session| session.step == Step::ChooseCategory)
            .map(|session| intake::advance(session, Input::Category(bank)));

        match transition {
            Some(transition) => self.apply(chat_id, message_id, transition).await,
            None => {
                self.reply(chat_id, message_id, prompts::start_registration_hint()).await;
            }
        }
    }

    async fn confirm(&mut self, chat_id: ChatId, message_id: MessageId) {
        let transition = self
            .sessions
            .get(chat_id)
            .map(|session| intake::advance(session, Input::Confirm));

        match transition {
            Some(transition @ Transition::Completed(_)) => {
                self.apply(chat_id, message_id, transition).await;
            }
            _ => {
                self.reply(chat_id, message_id, prompts::nothing_to_confirm()).await;
            }
        }
    }

    /// Dashboard, ledger and profile actions, available to registered chats only.
    async fn member_action(&mut self, chat_id: ChatId, message_id: MessageId, action: &str) {
        let Some(record) = self.registry.get(chat_id) else {
            self.reply(chat_id, message_id, prompts::not_registered()).await;
            return;
        };

        match action {
            actions::UPDATE_PROFILE => {
                let prompt = prompts::profile_bank_menu(&self.profile_banks);
                if self.reply(chat_id, message_id, prompt).await {
                    self.sessions.set(chat_id, Session::new(Step::ChooseCategory));
                    tracing::info!("Profile update started");
                }
            }
            actions::OPEN_DASHBOARD | actions::VIEW_DASHBOARD => {
                self.send(chat_id, prompts::dashboard(&record)).await;
            }
            ledger => {
                self.reply(chat_id, message_id, prompts::ledger_placeholder(ledger)).await;
            }
        }
    }

    /// Carry out a state machine transition.
    async fn apply(&mut self, chat_id: ChatId, message_id: MessageId, transition: Transition) {
        match transition {
            Transition::Advanced(next) => {
                let prompt = self.prompt_for(&next);
                let step = next.step;
                if self.reply(chat_id, message_id, prompt).await {
                    self.sessions.set(chat_id, next);
                    tracing::info!(step = step.as_str(), "Registration step advanced");
                } else {
                    tracing::warn!(step = step.as_str(), "Prompt not delivered, step not advanced");
                }
            }
            Transition::Rejected { step, error } => {
                self.sessions.touch(chat_id);
                tracing::info!(step = step.as_str(), error = %error, "Answer rejected");
                self.reply(chat_id, message_id, prompts::rejection(step, error)).await;
            }
            Transition::Completed(submission) => {
                self.complete(chat_id, message_id, submission).await;
            }
            Transition::Cancelled => {
                self.sessions.delete(chat_id);
                tracing::info!("Registration cancelled");
                self.reply(chat_id, message_id, prompts::cancelled()).await;
            }
            Transition::Ignored => {
                tracing::debug!("Input ignored by the registration flow");
            }
        }
    }

    async fn complete(&mut self, chat_id: ChatId, message_id: MessageId, submission: Submission) {
        let record = Record::from_submission(submission);

        match self.registry.put(chat_id, record.clone()) {
            Ok(()) => tracing::info!(bank = %record.bank, "Registration committed"),
            Err(e) => tracing::error!(
                error = %e,
                "Failed to persist registration, it will be lost"
            ),
        }
        self.sessions.delete(chat_id);

        if self.reply(chat_id, message_id, prompts::registered(&record)).await {
            self.send(chat_id, prompts::dashboard(&record)).await;
        }
    }

    /// Prompt asking for the step a session is now at.
    fn prompt_for(&self, session: &Session) -> Prompt {
        match session.step {
            Step::ChooseCategory => prompts::bank_menu(&self.form_title, &self.banks),
            Step::EnterName => prompts::name_prompt(),
            Step::EnterAccountNumber => prompts::account_prompt(),
            Step::Confirm => prompts::confirmation(&session.data),
        }
    }

    /// Reply to an inbound message. Returns whether the send went through.
    async fn reply(&self, chat_id: ChatId, message_id: MessageId, prompt: Prompt) -> bool {
        self.dispatcher
            .reply(chat_id, &prompt.text, prompt.options, Some(message_id))
            .await
            .is_ok()
    }

    async fn send(&self, chat_id: ChatId, prompt: Prompt) -> bool {
        self.dispatcher
            .send(chat_id, &prompt.text, prompt.options)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryChannel;
    use crate::registry::MemoryRegistry;
    use std::time::Duration;

    const CHAT: ChatId = ChatId(500);
    const DELAY: Duration = Duration::from_secs(30);

    struct Harness {
        channel: Arc<MemoryChannel>,
        scheduler: Arc<EphemeralScheduler>,
        handler: BotHandler,
    }

    fn harness_with(registry: MemoryRegistry, config: IntakeConfig) -> Harness {
        let channel = Arc::new(MemoryChannel::new());
        let scheduler = Arc::new(EphemeralScheduler::new(channel.clone(), DELAY));
        let dispatcher = ReplyDispatcher::new(channel.clone(), scheduler.clone());
        let handler = BotHandler::new(
            dispatcher,
            scheduler.clone(),
            Box::new(registry),
            &config,
        );
        Harness {
            channel,
            scheduler,
            handler,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryRegistry::new(), IntakeConfig::default())
    }

    fn record() -> Record {
        Record {
            bank: "BRI".into(),
            account_name: "Siti".into(),
            account_number: "987".into(),
            balance: 5_000,
            registered_at: None,
        }
    }

    fn registered_harness() -> Harness {
        let mut registry = MemoryRegistry::new();
        registry.put(CHAT, record()).unwrap();
        harness_with(registry, IntakeConfig::default())
    }

    fn action(id: i64, data: &str) -> InboundEvent {
        InboundEvent::action(CHAT, MessageId(id), format!("cb-{id}"), data)
    }

    fn text(id: i64, text: &str) -> InboundEvent {
        InboundEvent::text(CHAT, MessageId(id), text)
    }

    fn step(h: &mut Harness) -> Option<Step> {
        h.handler.session(CHAT).map(|s| s.step)
    }

    #[tokio::test(start_paused = true)]
    async fn start_command_replies_with_welcome_keyboard() {
        let mut h = harness();
        h.handler = h.handler.with_welcome_text("Selamat datang di bot");

        let cases = vec!["/start", "/start@intake_bot", "/start promo"];
        for (i, command) in cases.into_iter().enumerate() {
            let id = 10 + i as i64;
            h.handler.handle(text(id, command)).await;

            let last = h.channel.last_sent().unwrap();
            assert_eq!(last.text, "Selamat datang di bot");
            assert_eq!(last.options.reply_to, Some(MessageId(id)));
            assert_eq!(
                last.options.keyboard.unwrap().callback_data(),
                vec![actions::REGISTER, actions::LOGIN]
            );
            assert!(!h.scheduler.is_armed(CHAT, MessageId(id)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn commands_never_reach_the_form() {
        let mut h = harness();
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "bank:BCA")).await;
        let sent_before = h.channel.sent().len();

        h.handler.handle(text(3, "/help")).await;

        assert_eq!(step(&mut h), Some(Step::EnterName));
        assert_eq!(h.channel.sent().len(), sent_before);
        assert!(h.scheduler.is_armed(CHAT, MessageId(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn text_without_session_is_left_armed() {
        let mut h = harness();
        h.handler.handle(text(1, "halo")).await;

        assert!(h.channel.sent().is_empty());
        assert!(h.scheduler.is_armed(CHAT, MessageId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn every_action_is_acknowledged() {
        let mut h = harness();
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "nonsense")).await;

        assert_eq!(h.channel.acknowledged(), vec!["cb-1", "cb-2"]);
        assert!(h.channel.last_sent().unwrap().text.contains("tidak dikenali"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_prompt_does_not_advance_step() {
        let mut h = harness();
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "bank:BCA")).await;

        h.channel.set_fail_sends(true);
        h.handler.handle(text(3, "Agus Budiman")).await;
        assert_eq!(step(&mut h), Some(Step::EnterName));

        h.channel.set_fail_sends(false);
        h.handler.handle(text(4, "Agus Budiman")).await;
        assert_eq!(step(&mut h), Some(Step::EnterAccountNumber));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_menu_send_creates_no_session() {
        let mut h = harness();
        h.channel.set_fail_sends(true);
        h.handler.handle(action(1, actions::REGISTER)).await;

        assert_eq!(step(&mut h), None);
    }

    #[tokio::test(start_paused = true)]
    async fn category_outside_flow_gets_hint() {
        let mut h = harness();
        h.handler.handle(action(1, "bank:BCA")).await;

        assert_eq!(step(&mut h), None);
        assert!(h.channel.last_sent().unwrap().text.contains("Daftar"));
    }

    #[tokio::test(start_paused = true)]
    async fn text_at_category_step_is_ignored() {
        let mut h = harness();
        h.handler.handle(action(1, actions::REGISTER)).await;
        let sent_before = h.channel.sent().len();

        h.handler.handle(text(2, "BCA")).await;

        assert_eq!(step(&mut h), Some(Step::ChooseCategory));
        assert_eq!(h.channel.sent().len(), sent_before);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_without_session() {
        let mut h = harness();
        h.handler.handle(action(1, actions::CONFIRM)).await;

        assert!(h.handler.registry().get(CHAT).is_none());
        assert!(h.channel.last_sent().unwrap().text.contains("Tidak ada pendaftaran"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_session_at_any_step() {
        let mut h = harness();
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "bank:BNI")).await;
        h.handler.handle(text(3, "Budi")).await;
        assert_eq!(step(&mut h), Some(Step::EnterAccountNumber));

        h.handler.handle(action(4, actions::CANCEL)).await;

        assert_eq!(step(&mut h), None);
        assert!(!h.handler.registry().has(CHAT));
        assert_eq!(h.channel.last_sent().unwrap().text, "⛔ Pendaftaran dibatalkan.");
    }

    #[tokio::test(start_paused = true)]
    async fn registry_failure_still_destroys_session() {
        let mut h = harness_with(
            MemoryRegistry::new().with_failing_writes(),
            IntakeConfig::default(),
        );
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "bank:BCA")).await;
        h.handler.handle(text(3, "Agus Budiman")).await;
        h.handler.handle(text(4, "1234567890")).await;
        h.handler.handle(action(5, actions::CONFIRM)).await;

        assert_eq!(step(&mut h), None);
        assert!(!h.handler.registry().has(CHAT));
    }

    #[tokio::test(start_paused = true)]
    async fn unregistered_member_actions_ask_to_register() {
        let mut h = harness();
        let cases = vec![
            actions::DEPOSIT,
            actions::WITHDRAW,
            actions::BUY,
            actions::UPDATE_PROFILE,
            actions::OPEN_DASHBOARD,
        ];

        for (i, data) in cases.into_iter().enumerate() {
            h.handler.handle(action(i as i64, data)).await;
            assert!(
                h.channel.last_sent().unwrap().text.contains("belum terdaftar"),
                "{data}"
            );
        }
        assert_eq!(step(&mut h), None);
    }

    #[tokio::test(start_paused = true)]
    async fn ledger_actions_are_placeholders() {
        let mut h = registered_harness();
        let cases = vec![
            (actions::DEPOSIT, "Deposit"),
            (actions::WITHDRAW, "Withdraw"),
            (actions::BUY, "Beli"),
        ];

        for (data, expected) in cases {
            h.handler.handle(action(1, data)).await;
            assert!(h.channel.last_sent().unwrap().text.contains(expected));
        }
        assert_eq!(h.handler.registry().get(CHAT).unwrap().balance, 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn dashboard_is_sent_without_reply_reference() {
        let mut h = registered_harness();
        h.handler.handle(action(7, actions::VIEW_DASHBOARD)).await;

        let last = h.channel.last_sent().unwrap();
        assert!(last.text.contains("Rp 5.000"));
        assert_eq!(last.options.reply_to, None);
    }

    #[tokio::test(start_paused = true)]
    async fn update_profile_overwrites_record() {
        let mut h = registered_harness();
        h.handler.handle(action(1, actions::UPDATE_PROFILE)).await;

        let menu = h.channel.last_sent().unwrap();
        assert_eq!(
            menu.options.keyboard.unwrap().callback_data(),
            vec!["bank:Mandiri", "bank:BRI", "bank:BCA", "bank:DANAMON", actions::CANCEL]
        );
        assert_eq!(step(&mut h), Some(Step::ChooseCategory));

        h.handler.handle(action(2, "bank:BCA")).await;
        h.handler.handle(text(3, "Siti Aminah")).await;
        h.handler.handle(text(4, "111222")).await;
        h.handler.handle(action(5, actions::CONFIRM)).await;

        let stored = h.handler.registry().get(CHAT).unwrap();
        assert_eq!(stored.bank, "BCA");
        assert_eq!(stored.account_name, "Siti Aminah");
        assert_eq!(stored.balance, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn payload_is_echoed_and_disarmed() {
        let mut h = harness();
        let event = InboundEvent {
            chat_id: CHAT,
            message_id: MessageId(9),
            author_is_system: false,
            kind: EventKind::Payload("score=3".into()),
        };
        h.handler.handle(event).await;

        assert_eq!(h.channel.last_sent().unwrap().text, "📨 WebApp mengirim data: score=3");
        assert!(!h.scheduler.is_armed(CHAT, MessageId(9)));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted() {
        let config = IntakeConfig {
            session_idle_ttl_secs: Some(600),
            ..IntakeConfig::default()
        };
        let mut h = harness_with(MemoryRegistry::new(), config);
        h.handler.handle(action(1, actions::REGISTER)).await;

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(h.handler.evict_idle_sessions(), 0);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(h.handler.evict_idle_sessions(), 1);
        assert_eq!(step(&mut h), None);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_answers_keep_session_alive() {
        let config = IntakeConfig {
            session_idle_ttl_secs: Some(600),
            ..IntakeConfig::default()
        };
        let mut h = harness_with(MemoryRegistry::new(), config);
        h.handler.handle(action(1, actions::REGISTER)).await;
        h.handler.handle(action(2, "bank:BCA")).await;

        // Three wrong names, each inside the TTL of the previous one.
        for id in 10..13 {
            tokio::time::advance(Duration::from_secs(500)).await;
            h.handler.handle(text(id, "123")).await;
            assert_eq!(step(&mut h), Some(Step::EnterName));
        }

        tokio::time::advance(Duration::from_secs(500)).await;
        assert_eq!(h.handler.evict_idle_sessions(), 0);
        h.handler.handle(text(20, "Agus Budiman")).await;
        assert_eq!(step(&mut h), Some(Step::EnterAccountNumber));
    }

    #[tokio::test(start_paused = true)]
    async fn stray_text_at_button_step_counts_as_activity() {
        let config = IntakeConfig {
            session_idle_ttl_secs: Some(600),
            ..IntakeConfig::default()
        };
        let mut h = harness_with(MemoryRegistry::new(), config);
        h.handler.handle(action(1, actions::REGISTER)).await;

        tokio::time::advance(Duration::from_secs(500)).await;
        h.handler.handle(text(10, "BCA")).await;

        tokio::time::advance(Duration::from_secs(500)).await;
        assert_eq!(h.handler.evict_idle_sessions(), 0);
        assert_eq!(step(&mut h), Some(Step::ChooseCategory));
    }

    #[test]
    fn welcome_text_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("page.txt");
        std::fs::write(&present, "Halo dari file").unwrap();
        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "  \n").unwrap();
        let missing = dir.path().join("missing.txt");

        let cases = vec![
            (None, prompts::DEFAULT_WELCOME),
            (Some(present.as_path()), "Halo dari file"),
            (Some(empty.as_path()), prompts::DEFAULT_WELCOME),
            (Some(missing.as_path()), prompts::DEFAULT_WELCOME),
        ];
        for (path, expected) in cases {
            assert_eq!(load_welcome_text(path), expected);
        }
    }
}
