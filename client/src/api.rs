//! The backend contract, one method per API call.

use ballot_types::{
    Candidate, Election, LoginRequest, LoginResponse, NewCandidate, NewElection, RegisterRequest,
};

use crate::error::ClientError;

/// Request/response contract of the election backend.
///
/// Every method is a single round trip. Implementations never retry and
/// never cache; callers decide when to refetch.
#[allow(async_fn_in_trait)]
pub trait ElectionApi {
    /// `POST /api/auth/login`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError>;

    /// `POST /api/auth/register`.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError>;

    /// `GET /api/candidates/getcandidates`.
    async fn list_candidates(&self) -> Result<Vec<Candidate>, ClientError>;

    /// `POST /api/candidates/addcandidate`.
    async fn add_candidate(&self, candidate: &NewCandidate) -> Result<(), ClientError>;

    /// `GET /api/elections/getelections`.
    async fn list_elections(&self) -> Result<Vec<Election>, ClientError>;

    /// `POST /api/elections/addelection`.
    async fn add_election(&self, election: &NewElection) -> Result<(), ClientError>;

    /// `POST /api/elections/{id}/vote`.
    async fn cast_vote(&self, election_id: &str, candidate_name: &str) -> Result<(), ClientError>;
}
