//! Development backend for the ballot API.
//!
//! Serves the same routes the client calls, from memory:
//! - `POST /api/auth/login`, `POST /api/auth/register`
//! - `GET /api/candidates/getcandidates`, `POST /api/candidates/addcandidate`
//! - `GET /api/elections/getelections`, `POST /api/elections/addelection`
//! - `POST /api/elections/{id}/vote`
//!
//! Errors are returned as `{"error": "..."}` with a matching status code.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::RpcConfig;
pub use error::RpcError;
pub use server::{router, RpcServer};
pub use state::DevState;
