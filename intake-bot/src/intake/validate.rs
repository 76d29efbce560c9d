//! Per-step answer validation.

use regex::Regex;
use std::sync::LazyLock;

/// Letters of any script plus spaces.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L} ]+$").unwrap());
/// ASCII digits only; `\d` would also admit other scripts' digits.
static ACCOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Why an answer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("answer is empty")]
    Empty,

    #[error("name may only contain letters and spaces")]
    InvalidName,

    #[error("account number may only contain digits")]
    InvalidAccountNumber,
}

/// Validate an account holder name, returning it trimmed.
pub fn validate_name(input: &str) -> Result<String, FieldError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(FieldError::Empty);
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(FieldError::InvalidName);
    }
    Ok(name.to_string())
}

/// Validate an account number, returning it trimmed.
pub fn validate_account_number(input: &str) -> Result<String, FieldError> {
    let number = input.trim();
    if number.is_empty() {
        return Err(FieldError::Empty);
    }
    if !ACCOUNT_PATTERN.is_match(number) {
        return Err(FieldError::InvalidAccountNumber);
    }
    Ok(number.to_string())
}
