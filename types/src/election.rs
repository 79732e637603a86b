//! Elections and their vote tallies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candidate name → accumulated vote count for one election.
///
/// Candidate names are the join key; there is no indirection through
/// candidate identifiers.
pub type VoteTally = BTreeMap<String, u64>;

/// Lifecycle status of an election.
///
/// Transitions are driven by the backend; the client only reads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Created, not yet open for voting.
    Pending,
    /// Open for voting.
    Active,
    /// Voting has closed.
    Completed,
}

impl ElectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ElectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown election status: {other}")),
        }
    }
}

/// An election as served by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Externally assigned identifier.
    pub id: String,
    /// Free-form type label ("Local", "General", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Candidate names, in ballot order.
    pub candidates: Vec<String>,
    /// Election date as `YYYY-MM-DD`.
    pub date: String,
    pub status: ElectionStatus,
    /// Absent until the first vote is cast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<VoteTally>,
}

impl Election {
    pub fn is_active(&self) -> bool {
        self.status == ElectionStatus::Active
    }

    /// Whether `name` is on this election's ballot.
    pub fn has_candidate(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c == name)
    }

    /// Whether at least one vote has been recorded.
    pub fn has_votes(&self) -> bool {
        self.votes.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Parse the election date. Returns `None` for malformed dates.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Whole days from `today` until the election date (negative once past).
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.parsed_date().map(|d| (d - today).num_days())
    }

    /// Whether the election date lies strictly after `today`.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.parsed_date().is_some_and(|d| d > today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(status: ElectionStatus, date: &str) -> Election {
        Election {
            id: "E1".into(),
            kind: "Local".into(),
            candidates: vec!["Alice".into(), "Bob".into()],
            date: date.into(),
            status,
            votes: None,
        }
    }

    #[test]
    fn wire_format_uses_type_and_lowercase_status() {
        let json = r#"{"id":"E1","type":"Local","candidates":["Alice","Bob"],"date":"2025-01-01","status":"active"}"#;
        let e: Election = serde_json::from_str(json).unwrap();
        assert_eq!(e.kind, "Local");
        assert!(e.is_active());
        assert!(e.votes.is_none());

        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["type"], "Local");
        assert_eq!(back["status"], "active");
        assert!(back.get("votes").is_none());
    }

    #[test]
    fn has_votes_ignores_empty_tally() {
        let mut e = election(ElectionStatus::Active, "2025-01-01");
        assert!(!e.has_votes());
        e.votes = Some(VoteTally::new());
        assert!(!e.has_votes());
        e.votes.as_mut().unwrap().insert("Alice".into(), 1);
        assert!(e.has_votes());
    }

    #[test]
    fn days_until_counts_calendar_days() {
        let e = election(ElectionStatus::Pending, "2025-01-11");
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(e.days_until(today), Some(10));
        assert!(e.is_upcoming(today));
        assert!(!e.is_upcoming(NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()));
    }

    #[test]
    fn malformed_date_is_never_upcoming() {
        let e = election(ElectionStatus::Pending, "next tuesday");
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(e.days_until(today), None);
        assert!(!e.is_upcoming(today));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Active".parse::<ElectionStatus>(), Ok(ElectionStatus::Active));
        assert!("closed".parse::<ElectionStatus>().is_err());
    }
}
