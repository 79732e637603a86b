use ballot_types::ValidationError;
use thiserror::Error;

/// Failure of the client-side key/value store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(String),

    #[error("corrupt session data: {0}")]
    Corrupt(String),
}

/// Why a login or registration did not go through.
///
/// Backend and transport failures are deliberately collapsed into one
/// variant per operation; the cause is logged, not shown.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid credentials or role mismatch, please try again")]
    LoginRejected,

    #[error("registration failed, the email may already be in use")]
    RegistrationRejected,

    #[error(transparent)]
    Session(#[from] SessionError),
}
