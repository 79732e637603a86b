//! The application state object every front end drives.

use ballot_client::{ElectionApi, ElectionStore};
use ballot_results::ElectionSummary;
use ballot_session::{AuthGate, Session, SessionStorage};
use ballot_types::{
    Candidate, Credentials, Election, NewCandidate, NewElection, Portal, RegistrationForm, User,
};
use ballot_workflow::{OtpCode, OtpSource, VoteReceipt, VotingWorkflow};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::capability::{self, resolve};
use crate::error::{AppError, RouteError};
use crate::page::{PageKey, Screen};

/// Session, collections, vote workflow and current page, owned together.
///
/// Every operation that belongs to a page checks the capability table
/// first, so a front end cannot reach an action its role has no page for.
pub struct AppState<A, S> {
    auth: AuthGate<S>,
    store: ElectionStore<A>,
    workflow: VotingWorkflow,
    page: Option<PageKey>,
}

impl<A: ElectionApi, S: SessionStorage> AppState<A, S> {
    pub fn new(portal: Portal, api: A, storage: S) -> Self {
        Self {
            auth: AuthGate::new(portal, storage),
            store: ElectionStore::new(api),
            workflow: VotingWorkflow::new(),
            page: None,
        }
    }

    pub fn portal(&self) -> Portal {
        self.auth.portal()
    }

    pub fn auth(&self) -> &AuthGate<S> {
        &self.auth
    }

    pub fn store(&self) -> &ElectionStore<A> {
        &self.store
    }

    pub fn workflow(&self) -> &VotingWorkflow {
        &self.workflow
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    pub fn current_page(&self) -> Option<PageKey> {
        self.page
    }

    /// Pages the current user can open, default first.
    pub fn menu(&self) -> &'static [PageKey] {
        match self.user() {
            Some(user) => capability::allowed_pages(self.portal(), user.role),
            None => &[],
        }
    }

    /// Startup: restore a persisted session and, if there is one, load the
    /// collections.
    pub async fn init(&mut self) -> Result<Option<&Session>, AppError> {
        let restored = self.auth.restore()?.is_some();
        if restored {
            self.store.refresh().await?;
        }
        Ok(self.auth.session())
    }

    /// Log in and load the collections. If the first fetch fails the
    /// session is rolled back, stored keys included, so a failed login
    /// never leaves the user half signed in.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, AppError> {
        self.auth.login(self.store.api(), credentials).await?;
        self.page = None;
        self.workflow.reset();
        if let Err(e) = self.store.refresh().await {
            warn!(error = %e, "initial fetch failed, rolling back login");
            self.store.clear();
            self.auth.logout()?;
            return Err(e.into());
        }
        self.auth
            .session()
            .ok_or(AppError::Route(RouteError::NotAuthenticated))
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<(), AppError> {
        self.auth.register(self.store.api(), form).await?;
        Ok(())
    }

    /// Logout: drop the session, its storage keys, the workflow, the page
    /// and the cached collections.
    pub fn teardown(&mut self) -> Result<(), AppError> {
        self.workflow.reset();
        self.page = None;
        self.store.clear();
        self.auth.logout()?;
        Ok(())
    }

    /// Switch page. Leaving a page discards its in-progress vote.
    pub fn navigate(&mut self, page: PageKey) -> Result<Screen, AppError> {
        let screen = resolve(self.portal(), self.user(), Some(page))?;
        if screen == Screen::Login {
            return Err(RouteError::NotAuthenticated.into());
        }
        if self.page != Some(page) {
            self.workflow.reset();
        }
        debug!(%page, "navigated");
        self.page = Some(page);
        Ok(screen)
    }

    pub fn screen(&self) -> Result<Screen, RouteError> {
        resolve(self.portal(), self.user(), self.page)
    }

    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.require_user()?;
        self.store.refresh().await?;
        Ok(())
    }

    pub async fn add_candidate(&mut self, candidate: NewCandidate) -> Result<(), AppError> {
        self.require(PageKey::AddCandidate)?;
        self.store.add_candidate(candidate).await?;
        Ok(())
    }

    pub async fn add_election(&mut self, election: NewElection) -> Result<(), AppError> {
        self.require(PageKey::NewElection)?;
        self.store.add_election(election).await?;
        Ok(())
    }

    /// Candidate profile for a ballot name.
    pub fn candidate_profile(&self, name: &str) -> Result<Option<&Candidate>, AppError> {
        self.require_user()?;
        Ok(self.store.candidate_profile(name))
    }

    /// Elections the voter can pick from.
    pub fn active_elections(&self) -> Result<Vec<&Election>, AppError> {
        self.require(PageKey::CastVote)?;
        Ok(self.store.active_elections().collect())
    }

    pub fn select_election(&mut self, election_id: &str) -> Result<(), AppError> {
        self.require(PageKey::CastVote)?;
        self.workflow.select_election(self.store.elections(), election_id)?;
        Ok(())
    }

    pub fn select_candidate(&mut self, name: &str) -> Result<(), AppError> {
        self.require(PageKey::CastVote)?;
        self.workflow.select_candidate(self.store.elections(), name)?;
        Ok(())
    }

    pub fn request_vote(&mut self) -> Result<(), AppError> {
        self.require(PageKey::CastVote)?;
        self.workflow.request_vote()?;
        Ok(())
    }

    pub fn send_otp<O: OtpSource>(
        &mut self,
        phone: &str,
        otp: &mut O,
    ) -> Result<OtpCode, AppError> {
        self.require(PageKey::CastVote)?;
        Ok(self.workflow.send_otp(phone, otp)?)
    }

    pub async fn verify_otp(&mut self, code: &str) -> Result<VoteReceipt, AppError> {
        self.require(PageKey::CastVote)?;
        let receipt = self.workflow.verify_otp(code, &mut self.store).await?;
        info!(election_id = %receipt.election_id, "vote recorded");
        Ok(receipt)
    }

    pub fn cancel_vote(&mut self) {
        self.workflow.cancel();
    }

    /// Summaries of every election with at least one vote.
    pub fn results(&self) -> Result<Vec<ElectionSummary>, AppError> {
        self.require(PageKey::Results)?;
        Ok(self
            .store
            .elections_with_votes()
            .map(ElectionSummary::from_election)
            .collect())
    }

    /// Pending elections and upcoming ones with days left.
    pub fn pending(&self, today: NaiveDate) -> Result<PendingView<'_>, AppError> {
        self.require(PageKey::PendingElections)?;
        let upcoming = self
            .store
            .upcoming_elections(today)
            .into_iter()
            .filter_map(|e| e.days_until(today).map(|days| (e, days)))
            .collect();
        Ok(PendingView {
            pending: self.store.pending_elections().collect(),
            upcoming,
        })
    }

    fn require_user(&self) -> Result<&User, RouteError> {
        self.user().ok_or(RouteError::NotAuthenticated)
    }

    fn require(&self, page: PageKey) -> Result<(), RouteError> {
        let user = self.require_user()?;
        if capability::is_allowed(self.portal(), user.role, page) {
            Ok(())
        } else {
            Err(RouteError::Forbidden {
                role: user.role,
                page,
            })
        }
    }
}

/// Content of the pending-elections page.
#[derive(Debug)]
pub struct PendingView<'a> {
    pub pending: Vec<&'a Election>,
    /// Elections dated after today, soonest first, with days remaining.
    pub upcoming: Vec<(&'a Election, i64)>,
}
