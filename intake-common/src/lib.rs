//! Intake Common - Shared configuration, errors and logging for the intake bot.
//!
//! This crate provides:
//! - Configuration types and loading (file + environment overrides)
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup
//! - Small utility functions

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{Config, EphemeralConfig, IntakeConfig, ObservabilityConfig, TelegramConfig};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};
