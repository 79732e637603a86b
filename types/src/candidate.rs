//! Candidate profiles.

use serde::{Deserialize, Serialize};

/// A candidate profile held by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub mobile: String,
    /// Photo encoded as text (typically a `data:` URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}
