//! Nullable backend: an in-memory [`ElectionApi`] that records every call.

use ballot_client::{ClientError, ElectionApi};
use ballot_types::{
    Candidate, Election, ElectionStatus, LoginRequest, LoginResponse, NewCandidate, NewElection,
    RegisterRequest, Role, VoteTally,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// One method of the backend contract, for failure injection and counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Endpoint {
    Login,
    Register,
    ListCandidates,
    AddCandidate,
    ListElections,
    AddElection,
    CastVote,
}

/// A recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    Login { identifier: String },
    Register { email: String },
    ListCandidates,
    AddCandidate { name: String },
    ListElections,
    AddElection { id: String },
    CastVote { election_id: String, candidate: String },
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Login { .. } => Endpoint::Login,
            Self::Register { .. } => Endpoint::Register,
            Self::ListCandidates => Endpoint::ListCandidates,
            Self::AddCandidate { .. } => Endpoint::AddCandidate,
            Self::ListElections => Endpoint::ListElections,
            Self::AddElection { .. } => Endpoint::AddElection,
            Self::CastVote { .. } => Endpoint::CastVote,
        }
    }
}

#[derive(Clone, Debug)]
struct Account {
    email: String,
    username: String,
    password: String,
    response: LoginResponse,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    candidates: Vec<Candidate>,
    elections: Vec<Election>,
    calls: Vec<ApiCall>,
    failures: BTreeMap<Endpoint, ClientError>,
    next_id: u64,
}

/// A test backend.
///
/// Behaves like a well-mannered server: login checks the stored password,
/// votes are counted only for active elections and listed candidates, new
/// elections start active. Any endpoint can be made to fail with
/// [`NullElectionApi::fail_on`]; a failing call is still recorded but has
/// no effect.
///
/// Clones share state, so keep one clone for assertions after handing the
/// other to the code under test.
#[derive(Clone, Debug, Default)]
pub struct NullElectionApi {
    inner: Arc<Mutex<Inner>>,
}

impl NullElectionApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. `identifier` works as both email and username.
    pub fn with_user(self, identifier: &str, password: &str, role: Role, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = format!("u{}", inner.next_id);
            inner.accounts.push(Account {
                email: identifier.to_string(),
                username: identifier.to_string(),
                password: password.to_string(),
                response: LoginResponse {
                    id,
                    role,
                    name: Some(name.to_string()),
                    token: Some(format!("token-{identifier}")),
                },
            });
        }
        self
    }

    pub fn with_election(self, election: Election) -> Self {
        self.inner.lock().unwrap().elections.push(election);
        self
    }

    pub fn with_candidate(self, candidate: Candidate) -> Self {
        self.inner.lock().unwrap().candidates.push(candidate);
        self
    }

    /// Make every subsequent call to `endpoint` fail with `error`.
    pub fn fail_on(&self, endpoint: Endpoint, error: ClientError) {
        self.inner.lock().unwrap().failures.insert(endpoint, error);
    }

    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().failures.clear();
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    pub fn reset_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Current server-side elections.
    pub fn elections(&self) -> Vec<Election> {
        self.inner.lock().unwrap().elections.clone()
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.inner.lock().unwrap().candidates.clone()
    }

    /// Change an election's status behind the client's back.
    pub fn set_status(&self, election_id: &str, status: ElectionStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(e) = inner.elections.iter_mut().find(|e| e.id == election_id) {
            e.status = status;
        }
    }

    /// Record `call` and return the injected failure for it, if any.
    fn record(&self, call: ApiCall) -> Result<std::sync::MutexGuard<'_, Inner>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        let endpoint = call.endpoint();
        inner.calls.push(call);
        if let Some(error) = inner.failures.get(&endpoint).cloned() {
            return Err(error);
        }
        Ok(inner)
    }
}

fn bad_request(message: &str) -> ClientError {
    ClientError::Status {
        status: 400,
        message: message.to_string(),
    }
}

impl ElectionApi for NullElectionApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let identifier = request.identifier().unwrap_or_default().to_string();
        let inner = self.record(ApiCall::Login {
            identifier: identifier.clone(),
        })?;
        inner
            .accounts
            .iter()
            .find(|a| {
                (a.email == identifier || a.username == identifier)
                    && a.password == request.password
            })
            .map(|a| a.response.clone())
            .ok_or_else(|| ClientError::Status {
                status: 401,
                message: "invalid credentials".into(),
            })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        let mut inner = self.record(ApiCall::Register {
            email: request.email.clone(),
        })?;
        if inner.accounts.iter().any(|a| a.email == request.email) {
            return Err(bad_request("user already exists"));
        }
        inner.next_id += 1;
        let id = format!("u{}", inner.next_id);
        let username = request.username.clone().unwrap_or_else(|| request.email.clone());
        inner.accounts.push(Account {
            email: request.email.clone(),
            username,
            password: request.password.clone(),
            response: LoginResponse {
                id,
                role: request.role.unwrap_or(Role::Voter),
                name: Some(request.name.clone()),
                token: Some(format!("token-{}", request.email)),
            },
        });
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>, ClientError> {
        let inner = self.record(ApiCall::ListCandidates)?;
        Ok(inner.candidates.clone())
    }

    async fn add_candidate(&self, candidate: &NewCandidate) -> Result<(), ClientError> {
        let mut inner = self.record(ApiCall::AddCandidate {
            name: candidate.name.clone(),
        })?;
        inner.next_id += 1;
        let id = format!("c{}", inner.next_id);
        inner.candidates.push(Candidate {
            id,
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            mobile: candidate.mobile.clone(),
            photo: candidate.photo.clone(),
        });
        Ok(())
    }

    async fn list_elections(&self) -> Result<Vec<Election>, ClientError> {
        let inner = self.record(ApiCall::ListElections)?;
        Ok(inner.elections.clone())
    }

    async fn add_election(&self, election: &NewElection) -> Result<(), ClientError> {
        let mut inner = self.record(ApiCall::AddElection {
            id: election.id.clone(),
        })?;
        if inner.elections.iter().any(|e| e.id == election.id) {
            return Err(bad_request("election already exists"));
        }
        inner.elections.push(Election {
            id: election.id.clone(),
            kind: election.kind.clone(),
            candidates: election.candidates.clone(),
            date: election.date.clone(),
            status: ElectionStatus::Active,
            votes: None,
        });
        Ok(())
    }

    async fn cast_vote(&self, election_id: &str, candidate_name: &str) -> Result<(), ClientError> {
        let mut inner = self.record(ApiCall::CastVote {
            election_id: election_id.to_string(),
            candidate: candidate_name.to_string(),
        })?;
        let election = inner
            .elections
            .iter_mut()
            .find(|e| e.id == election_id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "election not found".into(),
            })?;
        if !election.is_active() {
            return Err(bad_request("election is not active"));
        }
        if !election.has_candidate(candidate_name) {
            return Err(bad_request("candidate is not on this ballot"));
        }
        *election
            .votes
            .get_or_insert_with(VoteTally::new)
            .entry(candidate_name.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}
