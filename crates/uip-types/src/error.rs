use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// An illegal lifecycle move. Carries both states; the caller's state is unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid lifecycle transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// A malformed Intent Record (programming-contract violation by the caller).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentValidationError {
    #[error("required field is missing or blank: {0}")]
    MissingField(&'static str),

    #[error("budget must be a finite, non-negative number")]
    InvalidBudget,
}
