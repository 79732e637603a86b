//! Users, roles, and the two portals sharing this client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which application the client is running as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    /// The election/voting tool.
    #[default]
    Election,
    /// The insurance-policy management portal.
    Insurance,
}

impl Portal {
    /// Roles a user of this portal can hold.
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Self::Election => &[Role::Admin, Role::Voter],
            Self::Insurance => &[Role::Admin, Role::Manager, Role::Employee, Role::Customer],
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// Whether the session survives a restart of the client.
    pub fn persists_session(&self) -> bool {
        matches!(self, Self::Insurance)
    }

    /// The role granted to self-service registrations.
    pub fn self_service_role(&self) -> Role {
        match self {
            Self::Election => Role::Voter,
            Self::Insurance => Role::Customer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Election => "election",
            Self::Insurance => "insurance",
        }
    }
}

impl std::str::FromStr for Portal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "election" => Ok(Self::Election),
            "insurance" => Ok(Self::Insurance),
            other => Err(format!("unknown portal: {other}")),
        }
    }
}

/// A user role. Which roles are meaningful depends on the [`Portal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Voter,
    Manager,
    Employee,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Voter => "voter",
            Self::Manager => "manager",
            Self::Employee => "employee",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "voter" => Ok(Self::Voter),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            "customer" => Ok(Self::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Name to show in the UI, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
