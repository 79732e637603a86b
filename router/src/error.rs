use ballot_client::ClientError;
use ballot_session::{AuthError, SessionError};
use ballot_types::Role;
use ballot_workflow::WorkflowError;
use thiserror::Error;

use crate::page::PageKey;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("please log in first")]
    NotAuthenticated,

    #[error("the {page} page is not available to the {role} role")]
    Forbidden { role: Role, page: PageKey },
}

/// Any failure surfaced by [`crate::AppState`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("{0}")]
    Client(#[from] ClientError),
}
