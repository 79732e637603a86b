//! In-memory backend state.

use std::sync::{Mutex, MutexGuard};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ballot_types::{
    Candidate, Election, ElectionStatus, LoginRequest, LoginResponse, NewCandidate, NewElection,
    RegisterRequest, Role, VoteTally,
};
use chrono::NaiveDate;
use rand::RngCore;
use tracing::{debug, info};

use crate::config::RpcConfig;
use crate::error::RpcError;

/// Bytes of randomness in an issued token.
const TOKEN_BYTES: usize = 32;

#[derive(Clone, Debug)]
struct Account {
    id: String,
    email: String,
    username: Option<String>,
    name: String,
    role: Role,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Collections {
    accounts: Vec<Account>,
    candidates: Vec<Candidate>,
    elections: Vec<Election>,
    next_id: u64,
}

impl Collections {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Accounts, candidates and elections, shared by all handlers.
///
/// Nothing is persisted. Password hashing happens outside the lock.
#[derive(Debug, Default)]
pub struct DevState {
    inner: Mutex<Collections>,
}

impl DevState {
    /// State with the configured admin account.
    pub fn seeded(config: &RpcConfig) -> Result<Self, RpcError> {
        let state = Self::default();
        let hash = hash_password(&config.admin_password)?;
        let mut inner = state.lock()?;
        let id = inner.next_id("u");
        inner.accounts.push(Account {
            id,
            email: config.admin_email.clone(),
            username: None,
            name: config.admin_name.clone(),
            role: Role::Admin,
            password_hash: hash,
        });
        drop(inner);
        info!(email = %config.admin_email, "seeded admin account");
        Ok(state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, RpcError> {
        self.inner
            .lock()
            .map_err(|_| RpcError::Internal("state lock poisoned".into()))
    }

    /// Check credentials; a requested role must match the account's.
    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RpcError> {
        let identifier = request.identifier().ok_or(RpcError::Unauthorized)?;
        let account = self
            .lock()?
            .accounts
            .iter()
            .find(|a| a.email == identifier || a.username.as_deref() == Some(identifier))
            .cloned()
            .ok_or(RpcError::Unauthorized)?;

        if !verify_password(&request.password, &account.password_hash) {
            return Err(RpcError::Unauthorized);
        }
        if request.role.is_some_and(|role| role != account.role) {
            return Err(RpcError::Unauthorized);
        }

        debug!(user = %account.id, "login accepted");
        Ok(LoginResponse {
            id: account.id,
            role: account.role,
            name: Some(account.name),
            token: Some(issue_token()),
        })
    }

    /// Create an account. Admin accounts cannot be self-registered.
    pub fn register(&self, request: &RegisterRequest) -> Result<(), RpcError> {
        if [&request.email, &request.password, &request.name]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(RpcError::BadRequest(
                "email, password and name are required".into(),
            ));
        }
        let role = request.role.unwrap_or(Role::Voter);
        if role == Role::Admin {
            return Err(RpcError::Forbidden("admin accounts cannot self-register".into()));
        }

        let password_hash = hash_password(&request.password)?;
        let mut inner = self.lock()?;
        let taken = inner.accounts.iter().any(|a| {
            a.email == request.email
                || (request.username.is_some() && a.username == request.username)
        });
        if taken {
            return Err(RpcError::Conflict("user".into()));
        }
        let id = inner.next_id("u");
        info!(user = %id, %role, "account registered");
        inner.accounts.push(Account {
            id,
            email: request.email.clone(),
            username: request.username.clone(),
            name: request.name.clone(),
            role,
            password_hash,
        });
        Ok(())
    }

    pub fn candidates(&self) -> Result<Vec<Candidate>, RpcError> {
        Ok(self.lock()?.candidates.clone())
    }

    pub fn add_candidate(&self, candidate: NewCandidate) -> Result<Candidate, RpcError> {
        candidate.validate()?;
        let mut inner = self.lock()?;
        let created = Candidate {
            id: inner.next_id("c"),
            name: candidate.name,
            address: candidate.address,
            mobile: candidate.mobile,
            photo: candidate.photo,
        };
        info!(id = %created.id, name = %created.name, "candidate added");
        inner.candidates.push(created.clone());
        Ok(created)
    }

    pub fn elections(&self) -> Result<Vec<Election>, RpcError> {
        Ok(self.lock()?.elections.clone())
    }

    /// Store a new election. It is pending if dated after `today` and
    /// active otherwise.
    pub fn add_election(
        &self,
        election: NewElection,
        today: NaiveDate,
    ) -> Result<Election, RpcError> {
        let election = election.validated()?;
        let date = NaiveDate::parse_from_str(&election.date, "%Y-%m-%d")
            .map_err(|_| RpcError::BadRequest(format!("invalid date: {}", election.date)))?;
        let status = if date > today {
            ElectionStatus::Pending
        } else {
            ElectionStatus::Active
        };

        let mut inner = self.lock()?;
        if inner.elections.iter().any(|e| e.id == election.id) {
            return Err(RpcError::Conflict(format!("election {}", election.id)));
        }
        let created = Election {
            id: election.id,
            kind: election.kind,
            candidates: election.candidates,
            date: election.date,
            status,
            votes: None,
        };
        info!(id = %created.id, status = %created.status.as_str(), "election added");
        inner.elections.push(created.clone());
        Ok(created)
    }

    /// Count one vote. Only active elections and listed candidates accept
    /// votes.
    pub fn cast_vote(&self, election_id: &str, candidate: &str) -> Result<(), RpcError> {
        let mut inner = self.lock()?;
        let election = inner
            .elections
            .iter_mut()
            .find(|e| e.id == election_id)
            .ok_or_else(|| RpcError::NotFound(format!("election {election_id}")))?;
        if !election.is_active() {
            return Err(RpcError::BadRequest(format!(
                "election {election_id} is not active"
            )));
        }
        if !election.has_candidate(candidate) {
            return Err(RpcError::BadRequest(format!(
                "{candidate} is not on the ballot"
            )));
        }
        *election
            .votes
            .get_or_insert_with(VoteTally::new)
            .entry(candidate.to_string())
            .or_insert(0) += 1;
        debug!(election_id, "vote counted");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, RpcError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RpcError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn state() -> DevState {
        DevState::seeded(&RpcConfig::default()).unwrap()
    }

    fn login(email: &str, password: &str, role: Option<Role>) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            username: None,
            password: password.into(),
            role,
        }
    }

    fn new_election(id: &str, date: &str) -> NewElection {
        NewElection {
            id: id.into(),
            kind: "Local".into(),
            candidates: vec!["Alice".into(), "Bob".into()],
            date: date.into(),
        }
    }

    #[test]
    fn seeded_admin_logs_in_and_gets_a_token() {
        let state = state();
        let response = state.login(&login("admin@ballot.local", "admin", None)).unwrap();
        assert_eq!(response.role, Role::Admin);
        assert_eq!(response.token.map(|t| t.len()), Some(TOKEN_BYTES * 2));
    }

    #[test]
    fn wrong_password_or_role_is_unauthorized() {
        let state = state();
        assert!(matches!(
            state.login(&login("admin@ballot.local", "nope", None)),
            Err(RpcError::Unauthorized)
        ));
        assert!(matches!(
            state.login(&login("admin@ballot.local", "admin", Some(Role::Voter))),
            Err(RpcError::Unauthorized)
        ));
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let state = state();
        let inner = state.lock().unwrap();
        assert!(inner.accounts[0].password_hash.starts_with("$argon2"));
    }

    #[test]
    fn registration_rejects_admin_and_duplicates() {
        let state = state();
        let mut request = RegisterRequest {
            email: "v@ballot.local".into(),
            password: "pw".into(),
            name: "Vic".into(),
            username: None,
            role: Some(Role::Admin),
            contact: None,
        };
        assert!(matches!(state.register(&request), Err(RpcError::Forbidden(_))));
        request.role = None;
        state.register(&request).unwrap();
        assert!(matches!(state.register(&request), Err(RpcError::Conflict(_))));
        assert_eq!(
            state.login(&login("v@ballot.local", "pw", None)).unwrap().role,
            Role::Voter
        );
    }

    #[test]
    fn status_follows_date() {
        let state = state();
        let past = state.add_election(new_election("E1", "2025-06-01"), today()).unwrap();
        let future = state.add_election(new_election("E2", "2025-06-02"), today()).unwrap();
        assert_eq!(past.status, ElectionStatus::Active);
        assert_eq!(future.status, ElectionStatus::Pending);
        assert!(matches!(
            state.add_election(new_election("E1", "2025-06-01"), today()),
            Err(RpcError::Conflict(_))
        ));
        assert!(matches!(
            state.add_election(new_election("E3", "June 1st"), today()),
            Err(RpcError::BadRequest(_))
        ));
    }

    #[test]
    fn padded_date_is_accepted() {
        let state = state();
        let created = state
            .add_election(new_election("E1", " 2025-07-01 "), today())
            .unwrap();
        assert_eq!(created.date, "2025-07-01");
        assert_eq!(created.status, ElectionStatus::Pending);
    }

    #[test]
    fn votes_only_for_active_elections_and_listed_candidates() {
        let state = state();
        state.add_election(new_election("E1", "2025-01-01"), today()).unwrap();
        state.add_election(new_election("E2", "2030-01-01"), today()).unwrap();

        state.cast_vote("E1", "Alice").unwrap();
        state.cast_vote("E1", "Alice").unwrap();
        assert!(matches!(
            state.cast_vote("E1", "Mallory"),
            Err(RpcError::BadRequest(_))
        ));
        assert!(matches!(
            state.cast_vote("E2", "Alice"),
            Err(RpcError::BadRequest(_))
        ));
        assert!(matches!(
            state.cast_vote("E9", "Alice"),
            Err(RpcError::NotFound(_))
        ));

        let e1 = state.elections().unwrap().remove(0);
        assert_eq!(e1.votes.and_then(|v| v.get("Alice").copied()), Some(2));
    }
}
