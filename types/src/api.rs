//! Request and response bodies of the HTTP JSON API.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Role, User};

/// Body of `POST /api/auth/login`.
///
/// The election portal logs in by email; the insurance portal logs in by
/// username and names the role it expects.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub role: Option<Role>,
}

impl LoginRequest {
    /// The email or username, whichever was supplied.
    pub fn identifier(&self) -> Option<&str> {
        self.email.as_deref().or(self.username.as_deref())
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Body returned by a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LoginResponse {
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            role: self.role,
            name: self.name.clone(),
        }
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/candidates/addcandidate`: a candidate minus its id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub address: String,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Body of `POST /api/elections/addelection`.
///
/// The id is chosen by the administrator; status and votes are assigned
/// by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewElection {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub candidates: Vec<String>,
    pub date: String,
}

/// Body of `POST /api/elections/{id}/vote`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "candidateName")]
    pub candidate_name: String,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_request_uses_camel_case_field() {
        let body = VoteRequest {
            candidate_name: "Alice".into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"candidateName":"Alice"}"#
        );
    }

    #[test]
    fn election_login_omits_username_and_role() {
        let req = LoginRequest {
            email: Some("a@b.co".into()),
            username: None,
            password: "pw".into(),
            role: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "a@b.co", "password": "pw" }));
        assert_eq!(req.identifier(), Some("a@b.co"));
    }

    #[test]
    fn debug_never_prints_password() {
        let req = LoginRequest {
            email: None,
            username: Some("jane".into()),
            password: "hunter22".into(),
            role: Some(Role::Customer),
        };
        assert!(!format!("{req:?}").contains("hunter22"));
    }

    #[test]
    fn login_response_tolerates_missing_token() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"id":"7","role":"voter","name":"Vee"}"#).unwrap();
        assert_eq!(resp.token, None);
        assert_eq!(resp.user().display_name(), "Vee");
    }
}
