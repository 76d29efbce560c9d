//! Bot-facing texts and keyboards.
//!
//! All user-supplied values are HTML-escaped before they are embedded in
//! HTML-mode messages.

use super::{FieldError, Step};
use crate::message::{InlineButton, InlineKeyboard, SendOptions};
use crate::registry::Record;
use crate::session::Draft;

/// Callback data carried by the bot's buttons.
pub mod actions {
    pub const REGISTER: &str = "daftar";
    pub const LOGIN: &str = "login";
    pub const CANCEL_LOGIN: &str = "cancel_login";
    pub const BANK_PREFIX: &str = "bank:";
    pub const CONFIRM: &str = "confirm_register";
    pub const CANCEL: &str = "cancel_register";
    pub const DEPOSIT: &str = "deposit";
    pub const WITHDRAW: &str = "withdraw";
    pub const BUY: &str = "buy";
    pub const UPDATE_PROFILE: &str = "update_profile";
    pub const OPEN_DASHBOARD: &str = "open_dashboard";
    pub const VIEW_DASHBOARD: &str = "view_dashboard";
}

/// Greeting used when no welcome file is configured or readable.
pub const DEFAULT_WELCOME: &str = "Halo! Selamat datang.";

/// A message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub options: SendOptions,
}

impl Prompt {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: SendOptions::default(),
        }
    }

    fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: SendOptions::html(),
        }
    }

    fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.options.keyboard = Some(keyboard);
        self
    }
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn cancel_button() -> InlineButton {
    InlineButton::callback("❌ Batal", actions::CANCEL)
}

fn bank_keyboard(banks: &[String]) -> InlineKeyboard {
    let buttons = banks
        .iter()
        .map(|b| InlineButton::callback(format!("🏦 {b}"), format!("{}{b}", actions::BANK_PREFIX)))
        .collect();
    InlineKeyboard::grid(buttons, 2).push_row(vec![cancel_button()])
}

/// Format an amount as Indonesian Rupiah, e.g. `Rp 1.250.000`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("Rp {sign}{grouped}")
}

pub fn welcome(text: &str) -> Prompt {
    Prompt::plain(text).with_keyboard(InlineKeyboard::new(vec![vec![
        InlineButton::callback("📝 Daftar", actions::REGISTER),
        InlineButton::callback("🔐 Login", actions::LOGIN),
    ]]))
}

/// Form title and the bank menu that opens a registration.
pub fn bank_menu(title: &str, banks: &[String]) -> Prompt {
    Prompt::html(format!(
        "<b>{}</b>\n\n📝 Silakan pilih <b>Nama Bank</b> terlebih dahulu:",
        escape(title)
    ))
    .with_keyboard(bank_keyboard(banks))
}

/// Bank menu offered to a registered user who updates the profile.
pub fn profile_bank_menu(banks: &[String]) -> Prompt {
    Prompt::plain("🔁 Memperbarui profil. Silakan pilih bank baru atau batalkan.")
        .with_keyboard(bank_keyboard(banks))
}

pub fn name_prompt() -> Prompt {
    Prompt::html(
        "👤 Silakan masukkan <b>Nama di Rekening</b> (hanya huruf dan spasi). Contoh: Agus Budiman",
    )
}

pub fn account_prompt() -> Prompt {
    Prompt::html("💳 Silakan masukkan <b>No Rekening</b> (hanya angka). Contoh: 1234567890")
}

/// Re-prompt for a rejected answer.
pub fn rejection(step: Step, error: FieldError) -> Prompt {
    tracing::trace!(step = step.as_str(), error = %error, "Building rejection prompt");
    match step {
        Step::EnterAccountNumber => Prompt::html(
            "❌ Nomor rekening tidak valid. Masukkan hanya angka tanpa spasi atau tanda lain.",
        ),
        _ => Prompt::html(
            "❌ Nama tidak valid. Masukkan hanya huruf dan spasi. Contoh: <b>Agus Budiman</b>",
        ),
    }
}

/// Summary shown before the user confirms.
pub fn confirmation(draft: &Draft) -> Prompt {
    let field = |v: &Option<String>| escape(v.as_deref().unwrap_or("-"));
    Prompt::html(format!(
        "<b>✅ Konfirmasi Pendaftaran</b>\n\n\
         🏦 <b>Bank:</b> {}\n\
         👤 <b>Nama di Rekening:</b> {}\n\
         💳 <b>No Rekening:</b> {}\n\n\
         Tekan <b>Konfirmasi</b> untuk menyelesaikan pendaftaran.",
        field(&draft.bank),
        field(&draft.account_name),
        field(&draft.account_number),
    ))
    .with_keyboard(InlineKeyboard::new(vec![vec![
        InlineButton::callback("✅ Konfirmasi", actions::CONFIRM),
        cancel_button(),
    ]]))
}

pub fn registered(record: &Record) -> Prompt {
    Prompt::html(format!(
        "<b>🎉 Pendaftaran Berhasil!</b>\n\n\
         Terima kasih, <b>{}</b>.\n\
         Bank: {}\n\
         No Rekening: {}\n\n\
         Saldo awal Anda adalah <b>{}</b>.",
        escape(&record.account_name),
        escape(&record.bank),
        escape(&record.account_number),
        format_rupiah(record.balance),
    ))
}

pub fn dashboard(record: &Record) -> Prompt {
    Prompt::html(format!(
        "<b>📊 Dashboard</b>\n\n\
         <b>Nama Lengkap:</b> {}\n\
         <b>Bank:</b> {}\n\
         <b>Saldo:</b> {}\n\n\
         Gunakan saldo untuk membeli, deposit, atau withdraw.",
        escape(&record.account_name),
        escape(&record.bank),
        format_rupiah(record.balance),
    ))
    .with_keyboard(InlineKeyboard::new(vec![
        vec![
            InlineButton::callback("💰 Deposit", actions::DEPOSIT),
            InlineButton::callback("💸 Withdraw", actions::WITHDRAW),
        ],
        vec![
            InlineButton::callback("🛒 Beli", actions::BUY),
            InlineButton::callback("🔁 Perbarui Profil", actions::UPDATE_PROFILE),
        ],
    ]))
}

pub fn cancelled() -> Prompt {
    Prompt::plain("⛔ Pendaftaran dibatalkan.")
}

pub fn already_registered() -> Prompt {
    Prompt::plain("Anda sudah terdaftar. Membuka dashboard Anda...")
}

pub fn start_registration_hint() -> Prompt {
    Prompt::plain("Silakan klik 📝 Daftar untuk memulai pendaftaran.")
}

pub fn nothing_to_confirm() -> Prompt {
    Prompt::plain("Tidak ada pendaftaran untuk dikonfirmasi. Silakan ulangi proses pendaftaran.")
}

pub fn not_registered() -> Prompt {
    Prompt::plain("Anda belum terdaftar. Silakan klik 📝 Daftar terlebih dahulu.")
}

/// Notice for balance features that are not available yet.
pub fn ledger_placeholder(action: &str) -> Prompt {
    let text = match action {
        actions::DEPOSIT => "💰 Deposit: fitur deposit akan datang.",
        actions::WITHDRAW => "💸 Withdraw: fitur withdraw akan datang.",
        _ => "🛒 Beli: fitur pembelian akan datang.",
    };
    Prompt::plain(text)
}

pub fn login_unavailable() -> Prompt {
    Prompt::plain(
        "🔐 Fitur login belum diimplementasikan. Silakan gunakan /start lalu Daftar jika belum terdaftar.",
    )
}

pub fn login_cancelled() -> Prompt {
    Prompt::plain("⛔ Login dibatalkan.")
}

/// Reply to data posted back by the advert web app.
pub fn web_app_data(data: &str) -> Prompt {
    match data {
        "ad_shown" => Prompt::plain(
            "✅ Terima kasih. Iklan selesai ditayangkan. Silakan lanjutkan proses login.",
        ),
        "ad_cancelled" => Prompt::plain("⛔ Anda membatalkan menonton iklan. Login dibatalkan."),
        other => Prompt::plain(format!("📨 WebApp mengirim data: {other}")),
    }
}

pub fn unknown_action() -> Prompt {
    Prompt::plain("Aksi tidak dikenali.")
}
