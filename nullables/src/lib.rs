//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the client (the backend, persistent
//! storage, code generation) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod api;
pub mod otp;
pub mod storage;

pub use api::{ApiCall, Endpoint, NullElectionApi};
pub use otp::NullOtp;
pub use storage::NullStorage;
