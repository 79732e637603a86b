//! Vote casting behind a phone verification challenge.
//!
//! [`VotingWorkflow`] walks a voter from election selection to a submitted
//! vote. The final step is gated by a six-digit code from an
//! [`OtpSource`]; the vote itself goes through
//! [`ballot_client::ElectionStore::cast_vote`].

pub mod error;
pub mod machine;
pub mod otp;

pub use error::WorkflowError;
pub use machine::{VoteReceipt, VotingStep, VotingWorkflow, MIN_PHONE_LEN, VOTE_CAST_MESSAGE};
pub use otp::{OtpCode, OtpSource, RandomOtp, OTP_DIGITS};
