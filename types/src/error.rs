//! Validation errors raised before any request leaves the client.

use crate::Role;
use thiserror::Error;

/// Input rejected by client-side form validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please fill in all required fields: {0}")]
    MissingFields(String),

    #[error("please provide names for all candidates")]
    BlankCandidateName,

    #[error("an election needs between {min} and {max} candidates, got {got}")]
    CandidateCount { min: usize, max: usize, got: usize },

    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("please select a role")]
    RoleRequired,

    #[error("role {0} is not available on this portal")]
    RoleNotAllowed(Role),

    #[error("role {0} cannot be self-registered")]
    RoleNotSelfService(Role),
}
