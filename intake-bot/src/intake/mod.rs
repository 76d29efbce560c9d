//! Registration state machine.
//!
//! The flow walks a closed, ordered set of steps:
//!
//! ```text
//! choose_category ─bank─▶ enter_name ─text─▶ enter_account_number ─text─▶ confirm
//!                                                                            │
//!                                              confirm ─▶ Completed ◀────────┤
//!                     cancel (from any step) ─▶ Cancelled ◀──────────────────┘
//! ```
//!
//! [`advance`] is pure: it reads the current session and returns what should
//! happen next without touching any store, so the caller decides when the
//! new state is committed.

pub mod prompts;
pub mod validate;

use crate::session::Session;
pub use validate::{validate_account_number, validate_name, FieldError};

/// One stage of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ChooseCategory,
    EnterName,
    EnterAccountNumber,
    Confirm,
}

impl Step {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChooseCategory => "choose_category",
            Self::EnterName => "enter_name",
            Self::EnterAccountNumber => "enter_account_number",
            Self::Confirm => "confirm",
        }
    }

    /// Whether this step is answered with free text.
    pub const fn accepts_text(&self) -> bool {
        matches!(self, Self::EnterName | Self::EnterAccountNumber)
    }
}

/// Input fed to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Menu selection (button press)
    Category(&'a str),
    /// Free text
    Text(&'a str),
    Confirm,
    Cancel,
}

/// Completed answers, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub bank: String,
    pub account_name: String,
    pub account_number: String,
}

/// Outcome of feeding one input to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Answer accepted; this is the session to store.
    Advanced(Session),
    /// Answer failed validation; the session stays where it is.
    Rejected { step: Step, error: FieldError },
    /// Confirmed; commit the submission and destroy the session.
    Completed(Submission),
    /// Cancelled; destroy the session without committing.
    Cancelled,
    /// Input does not belong to the current step.
    Ignored,
}

/// Compute the transition for `input` at the session's current step.
pub fn advance(session: &Session, input: Input<'_>) -> Transition {
    match (session.step, input) {
        (_, Input::Cancel) => Transition::Cancelled,

        (Step::ChooseCategory, Input::Category(bank)) => {
            let mut next = session.clone();
            next.data.bank = Some(bank.to_string());
            next.step = Step::EnterName;
            Transition::Advanced(next)
        }

        (Step::EnterName, Input::Text(text)) => match validate_name(text) {
            Ok(name) => {
                let mut next = session.clone();
                next.data.account_name = Some(name);
                next.step = Step::EnterAccountNumber;
                Transition::Advanced(next)
            }
            Err(error) => Transition::Rejected {
                step: Step::EnterName,
                error,
            },
        },

        (Step::EnterAccountNumber, Input::Text(text)) => match validate_account_number(text) {
            Ok(number) => {
                let mut next = session.clone();
                next.data.account_number = Some(number);
                next.step = Step::Confirm;
                Transition::Advanced(next)
            }
            Err(error) => Transition::Rejected {
                step: Step::EnterAccountNumber,
                error,
            },
        },

        (Step::Confirm, Input::Confirm) => {
            let data = &session.data;
            match (&data.bank, &data.account_name, &data.account_number) {
                (Some(bank), Some(account_name), Some(account_number)) => {
                    Transition::Completed(Submission {
                        bank: bank.clone(),
                        account_name: account_name.clone(),
                        account_number: account_number.clone(),
                    })
                }
                _ => Transition::Ignored,
            }
        }

        _ => Transition::Ignored,
    }
}
