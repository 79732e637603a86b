//! Results aggregation for a single election.
//!
//! Everything here is a pure function of the vote tally currently held by
//! the election store. Nothing is cached; callers recompute on every view.
//!
//! Winner tie-break: among candidates sharing the highest count, the
//! lexicographically smallest name wins. Standings use the same order for
//! equal counts.

use ballot_types::{Election, VoteTally};
use serde::Serialize;

/// Sum of all counts; 0 for an empty or absent tally.
pub fn total_votes(tally: Option<&VoteTally>) -> u64 {
    tally.map(|t| t.values().sum()).unwrap_or(0)
}

/// The candidate with the most votes, or `None` for an empty tally.
pub fn winner(tally: Option<&VoteTally>) -> Option<(&str, u64)> {
    // BTreeMap iterates names in ascending order, so keeping the first
    // maximum seen yields the smallest name among ties.
    tally?
        .iter()
        .fold(None, |best: Option<(&str, u64)>, (name, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name.as_str(), count)),
        })
}

/// `count / total * 100`, rounded to one decimal place. 0 when `total` is 0.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// One row of the detailed results table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub candidate: String,
    pub votes: u64,
    pub percentage: f64,
}

/// Candidates ordered by votes descending, ties by name ascending.
pub fn standings(tally: Option<&VoteTally>) -> Vec<Standing> {
    let total = total_votes(tally);
    let mut rows: Vec<Standing> = tally
        .into_iter()
        .flatten()
        .map(|(name, &votes)| Standing {
            candidate: name.clone(),
            votes,
            percentage: percentage(votes, total),
        })
        .collect();
    rows.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.candidate.cmp(&b.candidate)));
    rows
}

/// Derived statistics for one election.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElectionSummary {
    pub election_id: String,
    pub kind: String,
    pub date: String,
    /// Candidates on the ballot, voted for or not.
    pub candidate_count: usize,
    pub total_votes: u64,
    pub winner: Option<Standing>,
    pub standings: Vec<Standing>,
}

impl ElectionSummary {
    pub fn from_election(election: &Election) -> Self {
        let tally = election.votes.as_ref();
        let total = total_votes(tally);
        let winner = winner(tally).map(|(name, votes)| Standing {
            candidate: name.to_string(),
            votes,
            percentage: percentage(votes, total),
        });
        Self {
            election_id: election.id.clone(),
            kind: election.kind.clone(),
            date: election.date.clone(),
            candidate_count: election.candidates.len(),
            total_votes: total,
            winner,
            standings: standings(tally),
        }
    }

    /// The winner's share, or 0 when nobody has voted.
    pub fn winner_percentage(&self) -> f64 {
        self.winner.as_ref().map(|w| w.percentage).unwrap_or(0.0)
    }
}
