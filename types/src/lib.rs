//! Shared types for the ballot client.
//!
//! This crate defines the records exchanged with the backend (elections,
//! candidates, users), the JSON bodies of every API call, and the form
//! validation that runs before any of them is sent.

pub mod api;
pub mod candidate;
pub mod election;
pub mod error;
pub mod form;
pub mod user;

pub use api::{
    ErrorBody, LoginRequest, LoginResponse, NewCandidate, NewElection, RegisterRequest,
    VoteRequest,
};
pub use candidate::Candidate;
pub use election::{Election, ElectionStatus, VoteTally};
pub use error::ValidationError;
pub use form::{Credentials, RegistrationForm, MAX_CANDIDATES, MIN_CANDIDATES};
pub use user::{Portal, Role, User};
