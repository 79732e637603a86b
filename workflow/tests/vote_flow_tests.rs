//! The full vote flow: selection, phone challenge, submission.

use ballot_client::{ClientError, ElectionStore};
use ballot_nullables::{ApiCall, Endpoint, NullElectionApi, NullOtp};
use ballot_types::{Election, ElectionStatus};
use ballot_workflow::{VotingStep, VotingWorkflow, WorkflowError, VOTE_CAST_MESSAGE};

fn e1() -> Election {
    Election {
        id: "E1".into(),
        kind: "General".into(),
        candidates: vec!["Alice".into(), "Bob".into()],
        date: "2025-11-05".into(),
        status: ElectionStatus::Active,
        votes: None,
    }
}

async fn setup() -> (NullElectionApi, ElectionStore<NullElectionApi>) {
    let api = NullElectionApi::new().with_election(e1());
    let mut store = ElectionStore::new(api.clone());
    store.refresh().await.unwrap();
    api.reset_calls();
    (api, store)
}

/// Drive the workflow up to a pending code for Alice in E1.
fn challenge(wf: &mut VotingWorkflow, store: &ElectionStore<NullElectionApi>, otp: &mut NullOtp) {
    wf.select_election(store.elections(), "E1").unwrap();
    wf.select_candidate(store.elections(), "Alice").unwrap();
    wf.request_vote().unwrap();
    wf.send_otp("5551234567", otp).unwrap();
}

#[tokio::test]
async fn matching_code_casts_exactly_one_vote() {
    let (api, mut store) = setup().await;
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::constant(123_456);
    challenge(&mut wf, &store, &mut otp);

    let receipt = wf.verify_otp("123456", &mut store).await.unwrap();

    assert_eq!(receipt.election_id, "E1");
    assert_eq!(receipt.candidate, "Alice");
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::CastVote {
                election_id: "E1".into(),
                candidate: "Alice".into()
            },
            ApiCall::ListElections,
        ]
    );
    assert_eq!(wf.step(), &VotingStep::SelectingElection);
    assert_eq!(wf.success(), Some(VOTE_CAST_MESSAGE));
    let tally = store.find_election("E1").and_then(|e| e.votes.clone()).unwrap();
    assert_eq!(tally.get("Alice"), Some(&1));
}

#[tokio::test]
async fn mismatched_code_never_casts() {
    let (api, mut store) = setup().await;
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::constant(123_456);
    challenge(&mut wf, &store, &mut otp);

    let err = wf.verify_otp("654321", &mut store).await.unwrap_err();

    assert_eq!(err, WorkflowError::OtpMismatch);
    assert!(matches!(wf.step(), VotingStep::AwaitingCode { .. }));
    assert_eq!(wf.error(), Some(&WorkflowError::OtpMismatch));
    assert!(api.calls().is_empty());

    // The challenge is still open; the right code now goes through.
    wf.verify_otp("123456", &mut store).await.unwrap();
    assert_eq!(api.call_count(Endpoint::CastVote), 1);
}

#[tokio::test]
async fn resent_code_replaces_the_old_one() {
    let (api, mut store) = setup().await;
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::new(vec![111_111, 222_222]);
    challenge(&mut wf, &store, &mut otp);
    wf.send_otp("5551234567", &mut otp).unwrap();

    assert_eq!(
        wf.verify_otp("111111", &mut store).await,
        Err(WorkflowError::OtpMismatch)
    );
    wf.verify_otp("222222", &mut store).await.unwrap();
    assert_eq!(api.call_count(Endpoint::CastVote), 1);
}

#[tokio::test]
async fn backend_failure_still_resets_the_workflow() {
    let (api, mut store) = setup().await;
    api.fail_on(Endpoint::CastVote, ClientError::Transport("reset".into()));
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::default();
    challenge(&mut wf, &store, &mut otp);

    let err = wf.verify_otp("123456", &mut store).await.unwrap_err();

    assert_eq!(err, WorkflowError::VoteFailed);
    assert_eq!(wf.step(), &VotingStep::SelectingElection);
    assert!(wf.success().is_none());
    assert_eq!(api.call_count(Endpoint::ListElections), 0);
}

#[tokio::test]
async fn accepted_vote_reports_success_when_refetch_fails() {
    let (api, mut store) = setup().await;
    api.fail_on(Endpoint::ListElections, ClientError::Transport("timed out".into()));
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::default();
    challenge(&mut wf, &store, &mut otp);

    let receipt = wf.verify_otp("123456", &mut store).await.unwrap();

    assert_eq!(receipt.candidate, "Alice");
    assert_eq!(wf.success(), Some(VOTE_CAST_MESSAGE));
    assert!(wf.error().is_none());
    assert_eq!(wf.step(), &VotingStep::SelectingElection);
    assert_eq!(api.call_count(Endpoint::CastVote), 1);
    let server_tally = api.elections()[0].votes.clone().unwrap();
    assert_eq!(server_tally.get("Alice"), Some(&1));
}

#[tokio::test]
async fn cancel_returns_to_candidate_selection_without_casting() {
    let (api, store) = setup().await;
    let mut wf = VotingWorkflow::new();
    let mut otp = NullOtp::default();
    challenge(&mut wf, &store, &mut otp);

    wf.cancel();

    assert_eq!(wf.selected_election(), Some("E1"));
    assert_eq!(wf.selected_candidate(), Some("Alice"));
    assert!(wf.can_cast_vote());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn verify_without_challenge_is_rejected() {
    let (api, mut store) = setup().await;
    let mut wf = VotingWorkflow::new();
    assert_eq!(
        wf.verify_otp("123456", &mut store).await,
        Err(WorkflowError::NoChallenge)
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn election_closed_after_refresh_cannot_be_selected() {
    let (api, mut store) = setup().await;
    api.set_status("E1", ElectionStatus::Completed);
    store.refresh_elections().await.unwrap();

    let mut wf = VotingWorkflow::new();
    assert_eq!(
        wf.select_election(store.elections(), "E1"),
        Err(WorkflowError::ElectionNotActive("E1".into()))
    );
}
