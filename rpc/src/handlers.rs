//! HTTP handlers, one per API route.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ballot_types::{
    Candidate, Election, LoginRequest, LoginResponse, NewCandidate, NewElection, RegisterRequest,
    VoteRequest,
};
use chrono::Local;

use crate::error::RpcError;
use crate::state::DevState;

type Shared = State<Arc<DevState>>;

pub async fn login(
    State(state): Shared,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, RpcError> {
    state.login(&request).map(Json)
}

pub async fn register(
    State(state): Shared,
    Json(request): Json<RegisterRequest>,
) -> Result<StatusCode, RpcError> {
    state.register(&request)?;
    Ok(StatusCode::CREATED)
}

pub async fn list_candidates(State(state): Shared) -> Result<Json<Vec<Candidate>>, RpcError> {
    state.candidates().map(Json)
}

pub async fn add_candidate(
    State(state): Shared,
    Json(candidate): Json<NewCandidate>,
) -> Result<(StatusCode, Json<Candidate>), RpcError> {
    let created = state.add_candidate(candidate)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_elections(State(state): Shared) -> Result<Json<Vec<Election>>, RpcError> {
    state.elections().map(Json)
}

pub async fn add_election(
    State(state): Shared,
    Json(election): Json<NewElection>,
) -> Result<(StatusCode, Json<Election>), RpcError> {
    let today = Local::now().date_naive();
    let created = state.add_election(election, today)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn cast_vote(
    State(state): Shared,
    Path(election_id): Path<String>,
    Json(vote): Json<VoteRequest>,
) -> Result<StatusCode, RpcError> {
    state.cast_vote(&election_id, &vote.candidate_name)?;
    Ok(StatusCode::NO_CONTENT)
}
