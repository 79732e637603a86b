//! The vote-casting state machine.
//!
//! ```text
//! SelectingElection --select_election--> SelectingCandidate
//! SelectingCandidate --request_vote--> AwaitingPhoneNumber   (candidate chosen)
//! AwaitingPhoneNumber --send_otp--> AwaitingCode
//! AwaitingCode --send_otp--> AwaitingCode                   (fresh code)
//! AwaitingCode --verify_otp(match)--> SelectingElection     (vote submitted)
//! AwaitingPhoneNumber | AwaitingCode --cancel--> SelectingCandidate
//! ```

use ballot_client::{ElectionApi, ElectionStore};
use ballot_types::Election;
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::otp::{OtpCode, OtpSource};

/// Minimum accepted phone number length, in characters.
pub const MIN_PHONE_LEN: usize = 10;

/// Shown after a vote was accepted by the backend.
pub const VOTE_CAST_MESSAGE: &str = "Your vote has been cast successfully!";

/// Where the voter currently is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VotingStep {
    #[default]
    SelectingElection,
    SelectingCandidate {
        election_id: String,
        candidate: Option<String>,
    },
    AwaitingPhoneNumber {
        election_id: String,
        candidate: String,
    },
    AwaitingCode {
        election_id: String,
        candidate: String,
        phone: String,
        code: OtpCode,
    },
}

impl VotingStep {
    pub fn election_id(&self) -> Option<&str> {
        match self {
            Self::SelectingElection => None,
            Self::SelectingCandidate { election_id, .. }
            | Self::AwaitingPhoneNumber { election_id, .. }
            | Self::AwaitingCode { election_id, .. } => Some(election_id),
        }
    }

    pub fn candidate(&self) -> Option<&str> {
        match self {
            Self::SelectingElection => None,
            Self::SelectingCandidate { candidate, .. } => candidate.as_deref(),
            Self::AwaitingPhoneNumber { candidate, .. } | Self::AwaitingCode { candidate, .. } => {
                Some(candidate)
            }
        }
    }

    /// Whether the phone challenge is showing.
    pub fn in_challenge(&self) -> bool {
        matches!(
            self,
            Self::AwaitingPhoneNumber { .. } | Self::AwaitingCode { .. }
        )
    }
}

/// A vote the backend accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub election_id: String,
    pub candidate: String,
}

/// Drives one voter through selection, phone verification and submission.
///
/// Each operation either advances the step or leaves it unchanged and
/// records the error for display. The last error is cleared by the next
/// successful operation; the success message survives until the next one
/// is set or the workflow is reset.
#[derive(Debug, Default)]
pub struct VotingWorkflow {
    step: VotingStep,
    error: Option<WorkflowError>,
    success: Option<String>,
}

impl VotingWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &VotingStep {
        &self.step
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn selected_election(&self) -> Option<&str> {
        self.step.election_id()
    }

    pub fn selected_candidate(&self) -> Option<&str> {
        self.step.candidate()
    }

    /// True once both an election and a candidate are chosen and no
    /// challenge is in progress.
    pub fn can_cast_vote(&self) -> bool {
        matches!(
            self.step,
            VotingStep::SelectingCandidate {
                candidate: Some(_),
                ..
            }
        )
    }

    /// The code issued for the current challenge, if one was sent.
    pub fn pending_code(&self) -> Option<&OtpCode> {
        match &self.step {
            VotingStep::AwaitingCode { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Back to the initial step with no messages.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pick an election from `elections`. Only active elections qualify.
    /// Any previous candidate choice is dropped.
    pub fn select_election(
        &mut self,
        elections: &[Election],
        election_id: &str,
    ) -> Result<(), WorkflowError> {
        if self.step.in_challenge() {
            return self.fail(WorkflowError::ChallengeInProgress);
        }
        let Some(election) = elections.iter().find(|e| e.id == election_id) else {
            return self.fail(WorkflowError::UnknownElection(election_id.to_string()));
        };
        if !election.is_active() {
            return self.fail(WorkflowError::ElectionNotActive(election_id.to_string()));
        }

        debug!(election_id, "election selected");
        self.step = VotingStep::SelectingCandidate {
            election_id: election.id.clone(),
            candidate: None,
        };
        self.error = None;
        Ok(())
    }

    /// Pick a candidate on the selected election's ballot.
    pub fn select_candidate(
        &mut self,
        elections: &[Election],
        name: &str,
    ) -> Result<(), WorkflowError> {
        let election_id = match &self.step {
            VotingStep::SelectingElection => return self.fail(WorkflowError::NoElectionSelected),
            VotingStep::SelectingCandidate { election_id, .. } => election_id.clone(),
            _ => return self.fail(WorkflowError::ChallengeInProgress),
        };
        let on_ballot = elections
            .iter()
            .find(|e| e.id == election_id)
            .is_some_and(|e| e.has_candidate(name));
        if !on_ballot {
            return self.fail(WorkflowError::UnknownCandidate(name.to_string()));
        }

        debug!(election_id, candidate = name, "candidate selected");
        self.step = VotingStep::SelectingCandidate {
            election_id,
            candidate: Some(name.to_string()),
        };
        self.error = None;
        Ok(())
    }

    /// Open the phone challenge for the current selection.
    pub fn request_vote(&mut self) -> Result<(), WorkflowError> {
        let VotingStep::SelectingCandidate {
            election_id,
            candidate: Some(candidate),
        } = &self.step
        else {
            return self.fail(WorkflowError::NoSelection);
        };

        self.step = VotingStep::AwaitingPhoneNumber {
            election_id: election_id.clone(),
            candidate: candidate.clone(),
        };
        self.error = None;
        Ok(())
    }

    /// Issue a code for `phone`. Calling this again while a code is
    /// pending replaces the code.
    pub fn send_otp<O: OtpSource>(
        &mut self,
        phone: &str,
        otp: &mut O,
    ) -> Result<OtpCode, WorkflowError> {
        let (election_id, candidate) = match &self.step {
            VotingStep::AwaitingPhoneNumber {
                election_id,
                candidate,
            }
            | VotingStep::AwaitingCode {
                election_id,
                candidate,
                ..
            } => (election_id.clone(), candidate.clone()),
            _ => return self.fail(WorkflowError::NoSelection),
        };
        if phone.chars().count() < MIN_PHONE_LEN {
            return self.fail(WorkflowError::InvalidPhone);
        }

        let code = otp.generate();
        info!(election_id, "verification code issued");
        self.step = VotingStep::AwaitingCode {
            election_id,
            candidate,
            phone: phone.to_string(),
            code: code.clone(),
        };
        self.error = None;
        Ok(code)
    }

    /// Check `input` against the pending code and, on a match, submit the
    /// vote through `store`.
    ///
    /// A mismatch keeps the challenge open and sends nothing. On a match
    /// the workflow returns to its initial step before the vote is sent,
    /// whatever the backend answers.
    pub async fn verify_otp<A: ElectionApi>(
        &mut self,
        input: &str,
        store: &mut ElectionStore<A>,
    ) -> Result<VoteReceipt, WorkflowError> {
        let (election_id, candidate) = match std::mem::take(&mut self.step) {
            VotingStep::AwaitingCode {
                election_id,
                candidate,
                code,
                ..
            } if code.matches(input) => (election_id, candidate),
            other => {
                let error = if matches!(other, VotingStep::AwaitingCode { .. }) {
                    warn!("verification code mismatch");
                    WorkflowError::OtpMismatch
                } else {
                    WorkflowError::NoChallenge
                };
                self.step = other;
                return self.fail(error);
            }
        };
        self.error = None;
        self.success = None;

        match store.cast_vote(&election_id, &candidate).await {
            Ok(()) => {
                self.success = Some(VOTE_CAST_MESSAGE.to_string());
                Ok(VoteReceipt {
                    election_id,
                    candidate,
                })
            }
            Err(e) => {
                warn!(election_id, error = %e, "vote submission failed");
                self.fail(WorkflowError::VoteFailed)
            }
        }
    }

    /// Close the phone challenge, keeping the election and candidate.
    pub fn cancel(&mut self) {
        let step = std::mem::take(&mut self.step);
        self.step = match step {
            VotingStep::AwaitingPhoneNumber {
                election_id,
                candidate,
            }
            | VotingStep::AwaitingCode {
                election_id,
                candidate,
                ..
            } => {
                debug!(election_id, "challenge cancelled");
                self.error = None;
                VotingStep::SelectingCandidate {
                    election_id,
                    candidate: Some(candidate),
                }
            }
            other => other,
        };
    }

    fn fail<T>(&mut self, error: WorkflowError) -> Result<T, WorkflowError> {
        self.error = Some(error.clone());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{ElectionStatus, VoteTally};

    struct FixedOtp(u32);

    impl OtpSource for FixedOtp {
        fn generate(&mut self) -> OtpCode {
            self.0 += 1;
            OtpCode::from_number(self.0)
        }
    }

    fn election(id: &str, status: ElectionStatus) -> Election {
        Election {
            id: id.into(),
            kind: "General".into(),
            candidates: vec!["Alice".into(), "Bob".into()],
            date: "2025-11-05".into(),
            status,
            votes: Some(VoteTally::new()),
        }
    }

    fn elections() -> Vec<Election> {
        vec![
            election("E1", ElectionStatus::Active),
            election("E2", ElectionStatus::Pending),
        ]
    }

    fn at_phone_step(wf: &mut VotingWorkflow) {
        let list = elections();
        wf.select_election(&list, "E1").unwrap();
        wf.select_candidate(&list, "Alice").unwrap();
        wf.request_vote().unwrap();
    }

    #[test]
    fn only_active_elections_can_be_selected() {
        let mut wf = VotingWorkflow::new();
        let list = elections();
        assert_eq!(
            wf.select_election(&list, "E2"),
            Err(WorkflowError::ElectionNotActive("E2".into()))
        );
        assert_eq!(wf.step(), &VotingStep::SelectingElection);
        assert!(wf.error().is_some());

        assert_eq!(
            wf.select_election(&list, "nope"),
            Err(WorkflowError::UnknownElection("nope".into()))
        );
        wf.select_election(&list, "E1").unwrap();
        assert_eq!(wf.selected_election(), Some("E1"));
        assert!(wf.error().is_none());
    }

    #[test]
    fn selecting_an_election_clears_the_candidate() {
        let mut wf = VotingWorkflow::new();
        let mut list = elections();
        list.push(election("E3", ElectionStatus::Active));
        wf.select_election(&list, "E1").unwrap();
        wf.select_candidate(&list, "Bob").unwrap();
        assert!(wf.can_cast_vote());

        wf.select_election(&list, "E3").unwrap();
        assert_eq!(wf.selected_candidate(), None);
        assert!(!wf.can_cast_vote());
    }

    #[test]
    fn candidate_must_be_on_the_ballot() {
        let mut wf = VotingWorkflow::new();
        let list = elections();
        assert_eq!(
            wf.select_candidate(&list, "Alice"),
            Err(WorkflowError::NoElectionSelected)
        );
        wf.select_election(&list, "E1").unwrap();
        assert_eq!(
            wf.select_candidate(&list, "Mallory"),
            Err(WorkflowError::UnknownCandidate("Mallory".into()))
        );
        assert_eq!(wf.selected_candidate(), None);
    }

    #[test]
    fn request_vote_needs_both_selections() {
        let mut wf = VotingWorkflow::new();
        assert_eq!(wf.request_vote(), Err(WorkflowError::NoSelection));
        assert_eq!(
            wf.error().map(ToString::to_string).as_deref(),
            Some("please select an election and candidate first")
        );

        let list = elections();
        wf.select_election(&list, "E1").unwrap();
        assert_eq!(wf.request_vote(), Err(WorkflowError::NoSelection));
        assert_eq!(wf.step().election_id(), Some("E1"));
    }

    #[test]
    fn short_phone_numbers_are_rejected() {
        let mut wf = VotingWorkflow::new();
        at_phone_step(&mut wf);
        let mut otp = FixedOtp(0);

        assert_eq!(
            wf.send_otp("555-1234", &mut otp).err(),
            Some(WorkflowError::InvalidPhone)
        );
        assert!(matches!(wf.step(), VotingStep::AwaitingPhoneNumber { .. }));

        let code = wf.send_otp("5551234567", &mut otp).unwrap();
        assert_eq!(code.as_str(), "100001");
        assert_eq!(wf.pending_code(), Some(&code));
    }

    #[test]
    fn resending_replaces_the_code() {
        let mut wf = VotingWorkflow::new();
        at_phone_step(&mut wf);
        let mut otp = FixedOtp(0);
        wf.send_otp("5551234567", &mut otp).unwrap();
        wf.send_otp("5551234567", &mut otp).unwrap();
        assert_eq!(wf.pending_code().map(OtpCode::as_str), Some("100002"));
    }

    #[test]
    fn selection_is_locked_during_challenge() {
        let mut wf = VotingWorkflow::new();
        at_phone_step(&mut wf);
        let list = elections();
        assert_eq!(
            wf.select_election(&list, "E1"),
            Err(WorkflowError::ChallengeInProgress)
        );
        assert_eq!(
            wf.select_candidate(&list, "Bob"),
            Err(WorkflowError::ChallengeInProgress)
        );
        assert!(!wf.can_cast_vote());
    }

    #[test]
    fn cancel_keeps_selection() {
        let mut wf = VotingWorkflow::new();
        at_phone_step(&mut wf);
        wf.send_otp("5551234567", &mut FixedOtp(0)).unwrap();

        wf.cancel();
        assert_eq!(
            wf.step(),
            &VotingStep::SelectingCandidate {
                election_id: "E1".into(),
                candidate: Some("Alice".into()),
            }
        );
        assert!(wf.pending_code().is_none());

        // Outside a challenge cancel does nothing.
        wf.cancel();
        assert!(wf.can_cast_vote());
    }

    #[test]
    fn send_otp_without_challenge_fails() {
        let mut wf = VotingWorkflow::new();
        assert_eq!(
            wf.send_otp("5551234567", &mut FixedOtp(0)).err(),
            Some(WorkflowError::NoSelection)
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut wf = VotingWorkflow::new();
        at_phone_step(&mut wf);
        let _ = wf.send_otp("123", &mut FixedOtp(0));
        wf.reset();
        assert_eq!(wf.step(), &VotingStep::SelectingElection);
        assert!(wf.error().is_none());
        assert!(wf.success().is_none());
    }
}
