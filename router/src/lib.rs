//! Routing between screens, gated by role.
//!
//! [`AppState`] is the single object a front end holds: it owns the
//! authentication gate, the election store and the vote workflow, and
//! checks every page-bound action against the capability table in
//! [`capability`].

pub mod capability;
pub mod error;
pub mod page;
pub mod state;

pub use capability::{allowed_pages, default_page, is_allowed, resolve};
pub use error::{AppError, RouteError};
pub use page::{PageKey, Screen};
pub use state::{AppState, PendingView};
