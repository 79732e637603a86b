use thiserror::Error;

/// A workflow step that could not be taken. All of these are recoverable:
/// the workflow stays where it was and the user can try again.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("election {0} not found")]
    UnknownElection(String),

    #[error("election {0} is not open for voting")]
    ElectionNotActive(String),

    #[error("please select an election first")]
    NoElectionSelected,

    #[error("{0} is not on this ballot")]
    UnknownCandidate(String),

    #[error("please select an election and candidate first")]
    NoSelection,

    #[error("finish or cancel phone verification first")]
    ChallengeInProgress,

    #[error("please enter a valid phone number")]
    InvalidPhone,

    #[error("no verification code has been requested")]
    NoChallenge,

    #[error("invalid OTP, please try again")]
    OtpMismatch,

    #[error("your vote could not be cast, please try again")]
    VoteFailed,
}
