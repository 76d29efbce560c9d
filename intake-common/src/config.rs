//! Configuration for the intake bot.
//!
//! The bot reads a single JSON file, by default `~/.intake/config.json`
//! (override the path with `INTAKE_CONFIG`).
//!
//! # Configuration Priority
//!
//! 1. Environment variables (INTAKE_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `INTAKE_TELEGRAM_BOT_TOKEN` (or `TELEGRAM_BOT_TOKEN`) → telegram.bot_token
//! - `INTAKE_TELEGRAM_API_BASE` → telegram.api_base
//! - `INTAKE_DELETE_DELAY` → ephemeral.delete_delay
//! - `INTAKE_REGISTRY_PATH` → intake.registry_path
//! - `INTAKE_WELCOME_TEXT` → intake.welcome_text_path
//! - `INTAKE_SESSION_IDLE_TTL_SECS` → intake.session_idle_ttl_secs
//! - `INTAKE_LOG_LEVEL` → observability.log_level
//! - `INTAKE_LOG_FORMAT` → observability.log_format

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result, ResultExt};
use crate::util::parse_duration_secs;

/// Token value shipped in sample configs; treated as "not configured".
pub const PLACEHOLDER_TOKEN: &str = "PASTE_YOUR_TOKEN_HERE";

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".intake"),
        |dirs| dirs.home_dir().join(".intake"),
    )
}

/// Get the configuration file path, honouring `INTAKE_CONFIG`.
pub fn config_path() -> PathBuf {
    std::env::var("INTAKE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.json"))
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub ephemeral: EphemeralConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================================================
// Telegram
// ============================================================================

/// Telegram transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    #[serde(default)]
    pub bot_token: String,

    /// Usernames or numeric user ids allowed to talk to the bot ("*" = everyone)
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,

    /// Bot API base URL (overridable for tests and self-hosted API servers)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Long-poll timeout passed to getUpdates
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allowed_users: default_allowed_users(),
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".into()]
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

// ============================================================================
// Intake form
// ============================================================================

/// Registration form configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Title shown above the bank menu
    #[serde(default = "default_form_title")]
    pub form_title: String,

    /// Bank menu offered when registering
    #[serde(default = "default_banks")]
    pub banks: Vec<String>,

    /// Shorter bank menu offered when a registered user updates the profile
    #[serde(default = "default_profile_banks")]
    pub profile_banks: Vec<String>,

    /// Text file holding the /start greeting
    #[serde(default)]
    pub welcome_text_path: Option<PathBuf>,

    /// JSON file holding completed registrations
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Evict sessions idle for longer than this. Absent = sessions never expire.
    #[serde(default)]
    pub session_idle_ttl_secs: Option<u64>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            form_title: default_form_title(),
            banks: default_banks(),
            profile_banks: default_profile_banks(),
            welcome_text_path: None,
            registry_path: None,
            session_idle_ttl_secs: None,
        }
    }
}

impl IntakeConfig {
    /// Registry file path, defaulting to `users.json` in the config directory.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| config_dir().join("users.json"))
    }

    /// Idle TTL for sessions, if eviction is enabled.
    pub fn session_idle_ttl(&self) -> Option<Duration> {
        self.session_idle_ttl_secs.map(Duration::from_secs)
    }
}

fn default_form_title() -> String {
    "Form Register".into()
}

fn default_banks() -> Vec<String> {
    ["Mandiri", "BRI", "BCA", "DANAMON", "BSI", "BNI", "CIMB", "DANA", "GOPAY"]
        .iter()
        .map(|b| (*b).to_string())
        .collect()
}

fn default_profile_banks() -> Vec<String> {
    ["Mandiri", "BRI", "BCA", "DANAMON"]
        .iter()
        .map(|b| (*b).to_string())
        .collect()
}

// ============================================================================
// Ephemeral messages
// ============================================================================

/// Auto-deletion of unanswered inbound messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay before an unanswered message is deleted ("30s", "1s", "5m")
    #[serde(default = "default_delete_delay")]
    pub delete_delay: String,
}

impl Default for EphemeralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delete_delay: default_delete_delay(),
        }
    }
}

impl EphemeralConfig {
    /// Parsed delete delay.
    pub fn delete_delay(&self) -> std::result::Result<Duration, String> {
        parse_duration_secs(&self.delete_delay).map(Duration::from_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_delete_delay() -> String {
    "30s".into()
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Load configuration from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config from {}: {e}", path.display()))
        })
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("INTAKE_TELEGRAM_BOT_TOKEN").or_else(|| lookup("TELEGRAM_BOT_TOKEN")) {
            self.telegram.bot_token = token;
        }
        if let Some(base) = lookup("INTAKE_TELEGRAM_API_BASE") {
            self.telegram.api_base = base;
        }
        if let Some(delay) = lookup("INTAKE_DELETE_DELAY") {
            self.ephemeral.delete_delay = delay;
        }
        if let Some(path) = lookup("INTAKE_REGISTRY_PATH") {
            self.intake.registry_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("INTAKE_WELCOME_TEXT") {
            self.intake.welcome_text_path = Some(PathBuf::from(path));
        }
        if let Some(ttl) = lookup("INTAKE_SESSION_IDLE_TTL_SECS") {
            match ttl.parse() {
                Ok(secs) => self.intake.session_idle_ttl_secs = Some(secs),
                Err(_) => tracing::warn!(value = %ttl, "Ignoring invalid INTAKE_SESSION_IDLE_TTL_SECS"),
            }
        }
        if let Some(level) = lookup("INTAKE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("INTAKE_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}
