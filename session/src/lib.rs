//! Authentication gate and session persistence.
//!
//! [`AuthGate`] turns submitted credentials into a [`Session`] through the
//! backend's login call and mirrors it into a [`SessionStorage`] so the
//! insurance portal survives restarts.

pub mod error;
pub mod gate;
pub mod storage;

pub use error::{AuthError, SessionError};
pub use gate::{AuthGate, Session};
pub use storage::{FileStorage, SessionStorage, SESSION_TOKEN_KEY, SESSION_USER_KEY};
