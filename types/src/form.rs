//! Client-side form validation.
//!
//! Everything here runs before a request is built; a form that fails
//! validation never reaches the network.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::{LoginRequest, NewCandidate, NewElection, RegisterRequest};
use crate::error::ValidationError;
use crate::{Portal, Role};

/// Fewest candidates an election can be created with.
pub const MIN_CANDIDATES: usize = 2;
/// Most candidates an election can be created with.
pub const MAX_CANDIDATES: usize = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Whether `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn require(fields: &[(&str, &str)]) -> Result<(), ValidationError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing.join(", ")))
    }
}

impl NewCandidate {
    /// Name, address and mobile are required; the photo is optional.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("name", self.name.as_str()),
            ("address", self.address.as_str()),
            ("mobile", self.mobile.as_str()),
        ])
    }
}

impl NewElection {
    /// Validate and normalise: every text field and candidate name is
    /// trimmed.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        require(&[
            ("id", self.id.as_str()),
            ("type", self.kind.as_str()),
            ("date", self.date.as_str()),
        ])?;

        let got = self.candidates.len();
        if !(MIN_CANDIDATES..=MAX_CANDIDATES).contains(&got) {
            return Err(ValidationError::CandidateCount {
                min: MIN_CANDIDATES,
                max: MAX_CANDIDATES,
                got,
            });
        }
        if self.candidates.iter().any(|name| name.trim().is_empty()) {
            return Err(ValidationError::BlankCandidateName);
        }

        self.candidates = self
            .candidates
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        self.id = self.id.trim().to_string();
        self.kind = self.kind.trim().to_string();
        self.date = self.date.trim().to_string();
        Ok(self)
    }
}

/// What a user types into a login form.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// Email (election portal) or username (insurance portal).
    pub identifier: String,
    pub password: String,
    /// Required on the insurance portal, ignored on the election portal.
    pub role: Option<Role>,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Build the login body for `portal`.
    pub fn to_request(&self, portal: Portal) -> Result<LoginRequest, ValidationError> {
        require(&[
            ("identifier", self.identifier.as_str()),
            ("password", self.password.as_str()),
        ])?;
        let identifier = self.identifier.trim().to_string();
        match portal {
            Portal::Election => Ok(LoginRequest {
                email: Some(identifier),
                username: None,
                password: self.password.clone(),
                role: None,
            }),
            Portal::Insurance => {
                let role = self.role.ok_or(ValidationError::RoleRequired)?;
                if !portal.allows(role) {
                    return Err(ValidationError::RoleNotAllowed(role));
                }
                Ok(LoginRequest {
                    email: None,
                    username: Some(identifier),
                    password: self.password.clone(),
                    role: Some(role),
                })
            }
        }
    }
}

/// What a user types into a registration form.
#[derive(Clone, Debug, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Insurance portal only.
    pub username: Option<String>,
    /// Insurance portal only; must equal `password`.
    pub confirm_password: Option<String>,
    /// Defaults to the portal's self-service role.
    pub role: Option<Role>,
    pub contact: Option<String>,
}

impl RegistrationForm {
    /// Build the registration body for `portal`.
    pub fn to_request(&self, portal: Portal) -> Result<RegisterRequest, ValidationError> {
        require(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("name", self.name.as_str()),
        ])?;

        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        let role = self.role.unwrap_or_else(|| portal.self_service_role());
        if !portal.allows(role) {
            return Err(ValidationError::RoleNotAllowed(role));
        }
        if role != portal.self_service_role() {
            return Err(ValidationError::RoleNotSelfService(role));
        }

        match portal {
            Portal::Election => Ok(RegisterRequest {
                email: email.to_string(),
                password: self.password.clone(),
                name: self.name.trim().to_string(),
                username: None,
                role: None,
                contact: None,
            }),
            Portal::Insurance => {
                let username = self.username.as_deref().unwrap_or_default();
                require(&[("username", username)])?;
                if self.confirm_password.as_deref() != Some(self.password.as_str()) {
                    return Err(ValidationError::PasswordMismatch);
                }
                Ok(RegisterRequest {
                    email: email.to_string(),
                    password: self.password.clone(),
                    name: self.name.trim().to_string(),
                    username: Some(username.trim().to_string()),
                    role: Some(role),
                    contact: self
                        .contact
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string),
                })
            }
        }
    }
}
