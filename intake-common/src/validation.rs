//! Configuration validation.
//!
//! Catches the mistakes that would otherwise only show up once the bot is
//! running: a missing token, an unparsable delete delay, an empty bank menu.

use std::time::Duration;
use thiserror::Error;

use crate::config::{
    Config, EphemeralConfig, IntakeConfig, ObservabilityConfig, TelegramConfig, PLACEHOLDER_TOKEN,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty"];

/// Telegram only deletes messages younger than 48 hours.
const MAX_DELETE_DELAY: Duration = Duration::from_secs(48 * 3600);

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.telegram.validate(),
            self.intake.validate(),
            self.ephemeral.validate(),
            self.observability.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for TelegramConfig {
    fn validate(&self) -> ValidationResult<()> {
        let token = self.bot_token.trim();
        if token.is_empty() || token == PLACEHOLDER_TOKEN {
            return Err(ValidationError::MissingField {
                field: "telegram.bot_token".into(),
            });
        }
        if self.allowed_users.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "telegram.allowed_users".into(),
                reason: "empty list rejects every user; use [\"*\"] to allow everyone".into(),
            });
        }
        Ok(())
    }
}

impl Validate for IntakeConfig {
    fn validate(&self) -> ValidationResult<()> {
        for (field, banks) in [("intake.banks", &self.banks), ("intake.profile_banks", &self.profile_banks)] {
            if banks.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "at least one bank is required".into(),
                });
            }
            if let Some(bad) = banks.iter().find(|b| b.trim().is_empty() || b.contains(':')) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: format!("invalid bank name '{bad}'"),
                });
            }
        }
        if self.session_idle_ttl_secs == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "intake.session_idle_ttl_secs".into(),
                reason: "must be greater than zero when set".into(),
            });
        }
        Ok(())
    }
}

impl Validate for EphemeralConfig {
    fn validate(&self) -> ValidationResult<()> {
        match self.delete_delay() {
            Ok(delay) if delay.is_zero() => Err(ValidationError::InvalidValue {
                field: "ephemeral.delete_delay".into(),
                reason: "must be greater than zero".into(),
            }),
            Ok(delay) if delay > MAX_DELETE_DELAY => Err(ValidationError::InvalidValue {
                field: "ephemeral.delete_delay".into(),
                reason: "must be at most 48h, Telegram refuses to delete older messages".into(),
            }),
            Ok(_) => Ok(()),
            Err(reason) => Err(ValidationError::InvalidValue {
                field: "ephemeral.delete_delay".into(),
                reason,
            }),
        }
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("expected one of {LOG_LEVELS:?}"),
            });
        }
        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("expected one of {LOG_FORMATS:?}"),
            });
        }
        Ok(())
    }
}
