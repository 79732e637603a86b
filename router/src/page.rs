//! Page keys and the screens they resolve to.

use ballot_types::Role;
use std::fmt;

/// A navigable page. Keys are the strings used by the navigation menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKey {
    AddCandidate,
    NewElection,
    CastVote,
    Results,
    PendingElections,
    Dashboard,
}

impl PageKey {
    pub const ALL: [PageKey; 6] = [
        Self::AddCandidate,
        Self::NewElection,
        Self::CastVote,
        Self::Results,
        Self::PendingElections,
        Self::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddCandidate => "add-candidate",
            Self::NewElection => "new-election",
            Self::CastVote => "cast-vote",
            Self::Results => "results",
            Self::PendingElections => "pending-elections",
            Self::Dashboard => "dashboard",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddCandidate => "Add Candidate",
            Self::NewElection => "Add New Election",
            Self::CastVote => "Cast Vote",
            Self::Results => "Election Results",
            Self::PendingElections => "Pending Elections",
            Self::Dashboard => "Dashboard",
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown page: {s}"))
    }
}

/// What is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    AddCandidate,
    NewElection,
    CastVote,
    Results,
    PendingElections,
    /// Insurance portal landing page for the given role.
    Dashboard(Role),
}

impl Screen {
    /// The screen for an allowed page, viewed by `role`.
    pub fn for_page(page: PageKey, role: Role) -> Self {
        match page {
            PageKey::AddCandidate => Self::AddCandidate,
            PageKey::NewElection => Self::NewElection,
            PageKey::CastVote => Self::CastVote,
            PageKey::Results => Self::Results,
            PageKey::PendingElections => Self::PendingElections,
            PageKey::Dashboard => Self::Dashboard(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for key in PageKey::ALL {
            assert_eq!(key.as_str().parse::<PageKey>(), Ok(key));
        }
        assert!("logout".parse::<PageKey>().is_err());
    }

    #[test]
    fn dashboard_carries_role() {
        assert_eq!(
            Screen::for_page(PageKey::Dashboard, Role::Manager),
            Screen::Dashboard(Role::Manager)
        );
    }
}
