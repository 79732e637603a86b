//! Client-side proxy over the backend's election and candidate collections.

use ballot_types::{
    Candidate, Election, ElectionStatus, LoginRequest, LoginResponse, NewCandidate, NewElection,
    RegisterRequest,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::ElectionApi;
use crate::error::ClientError;

/// Local snapshot of the backend's collections.
///
/// The backend is the only writer. Every mutation is sent to the API and,
/// on success, the affected collection is refetched; nothing is applied
/// locally first. A failed mutation leaves the snapshot untouched.
pub struct ElectionStore<A> {
    api: A,
    candidates: Vec<Candidate>,
    elections: Vec<Election>,
}

impl<A: ElectionApi> ElectionStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            candidates: Vec::new(),
            elections: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn elections(&self) -> &[Election] {
        &self.elections
    }

    /// Fetch both collections (session start).
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.refresh_candidates().await?;
        self.refresh_elections().await
    }

    pub async fn refresh_candidates(&mut self) -> Result<(), ClientError> {
        self.candidates = self.api.list_candidates().await?;
        debug!(count = self.candidates.len(), "candidates refreshed");
        Ok(())
    }

    pub async fn refresh_elections(&mut self) -> Result<(), ClientError> {
        self.elections = self.api.list_elections().await?;
        debug!(count = self.elections.len(), "elections refreshed");
        Ok(())
    }

    /// Drop the local snapshot (logout).
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.elections.clear();
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.api.login(request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        self.api.register(request).await
    }

    /// Validate, submit, then refetch candidates.
    pub async fn add_candidate(&mut self, candidate: NewCandidate) -> Result<(), ClientError> {
        candidate.validate()?;
        self.api.add_candidate(&candidate).await.inspect_err(|e| {
            warn!(name = %candidate.name, error = %e, "add candidate rejected");
        })?;
        info!(name = %candidate.name, "candidate added");
        self.refresh_candidates().await
    }

    /// Validate, submit, then refetch elections.
    pub async fn add_election(&mut self, election: NewElection) -> Result<(), ClientError> {
        let election = election.validated()?;
        self.api.add_election(&election).await.inspect_err(|e| {
            warn!(id = %election.id, error = %e, "add election rejected");
        })?;
        info!(id = %election.id, "election added");
        self.refresh_elections().await
    }

    /// Submit a vote, then refetch elections.
    ///
    /// Only a rejected vote is an error. Once the backend has accepted the
    /// vote a failed refetch is logged and the previous snapshot is kept.
    pub async fn cast_vote(
        &mut self,
        election_id: &str,
        candidate_name: &str,
    ) -> Result<(), ClientError> {
        self.api
            .cast_vote(election_id, candidate_name)
            .await
            .inspect_err(|e| warn!(election_id, error = %e, "vote rejected"))?;
        info!(election_id, "vote cast");
        if let Err(e) = self.refresh_elections().await {
            warn!(election_id, error = %e, "elections refetch after vote failed");
        }
        Ok(())
    }

    pub fn find_election(&self, id: &str) -> Option<&Election> {
        self.elections.iter().find(|e| e.id == id)
    }

    /// Profile for a ballot name. Ballots are not linked to profiles, so
    /// this can legitimately return `None`.
    pub fn candidate_profile(&self, name: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.name == name)
    }

    /// Elections open for voting.
    pub fn active_elections(&self) -> impl Iterator<Item = &Election> {
        self.with_status(ElectionStatus::Active)
    }

    pub fn pending_elections(&self) -> impl Iterator<Item = &Election> {
        self.with_status(ElectionStatus::Pending)
    }

    /// Elections with at least one recorded vote, i.e. those with results.
    pub fn elections_with_votes(&self) -> impl Iterator<Item = &Election> {
        self.elections.iter().filter(|e| e.has_votes())
    }

    /// Elections dated after `today`, soonest first.
    pub fn upcoming_elections(&self, today: NaiveDate) -> Vec<&Election> {
        let mut upcoming: Vec<&Election> = self
            .elections
            .iter()
            .filter(|e| e.is_upcoming(today))
            .collect();
        upcoming.sort_by_key(|e| e.parsed_date());
        upcoming
    }

    fn with_status(&self, status: ElectionStatus) -> impl Iterator<Item = &Election> {
        self.elections.iter().filter(move |e| e.status == status)
    }
}
