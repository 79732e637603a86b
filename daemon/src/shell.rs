//! Line-oriented front end over [`AppState`].

use std::collections::BTreeMap;
use std::io::Write;

use ballot_client::ElectionApi;
use ballot_router::{AppError, AppState, PageKey, Screen};
use ballot_session::SessionStorage;
use ballot_types::{Credentials, NewCandidate, NewElection, Portal, RegistrationForm, Role};
use ballot_workflow::OtpSource;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
commands:
  login <identifier> <password> [role]
  register email=.. password=.. name=.. [username=..] [confirm=..] [contact=..]
  logout | whoami | menu | page <key> | refresh
  elections | candidates | profile <name>
  select-election <id> | select-candidate <name> | vote
  phone <number> | otp <code> | cancel
  results | pending
  add-candidate name=.. address=.. mobile=.. [photo=..]
  add-election id=.. type=.. date=YYYY-MM-DD candidates=A,B[,..]
  help | quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the read loop should keep going.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Split a line into words. Single or double quotes group words; the
/// quotes themselves are dropped.
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse `key=value` words.
fn options(words: &[String]) -> Result<BTreeMap<&str, &str>, ShellError> {
    words
        .iter()
        .map(|w| {
            w.split_once('=')
                .ok_or_else(|| ShellError::InvalidArgument(format!("expected key=value, got {w}")))
        })
        .collect()
}

fn required<'a>(opts: &BTreeMap<&str, &'a str>, key: &str) -> &'a str {
    opts.get(key).copied().unwrap_or_default()
}

fn optional(opts: &BTreeMap<&str, &str>, key: &str) -> Option<String> {
    opts.get(key).map(|v| v.to_string())
}

/// Interactive session over an [`AppState`].
pub struct Shell<A, S, O> {
    app: AppState<A, S>,
    otp: O,
    today: NaiveDate,
}

impl<A: ElectionApi, S: SessionStorage, O: OtpSource> Shell<A, S, O> {
    pub fn new(app: AppState<A, S>, otp: O, today: NaiveDate) -> Self {
        Self { app, otp, today }
    }

    pub fn app(&self) -> &AppState<A, S> {
        &self.app
    }

    /// Restore any saved session, then read commands until EOF or `quit`.
    /// Command failures are printed and the loop continues.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let portal = self.app.portal();
        match self.app.init().await {
            Ok(Some(session)) => writeln!(
                out,
                "welcome back, {} ({})",
                session.user.display_name(),
                session.user.role
            )?,
            Ok(None) => writeln!(out, "{} portal, please log in", portal.as_str())?,
            Err(e) => writeln!(out, "error: {e}")?,
        }

        let mut lines = input.lines();
        loop {
            write!(out, "{}> ", self.prompt())?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            match self.execute(&line, out).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(CommandError::Io(e)) => return Err(e),
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        match self.app.current_page().or_else(|| self.app.menu().first().copied()) {
            Some(page) if self.app.user().is_some() => page.to_string(),
            _ => "ballot".to_string(),
        }
    }

    async fn execute<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<Flow, CommandError> {
        let words = tokenize(line)?;
        let Some((command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };
        debug!(command = %command, "shell command");

        match command.as_str() {
            "help" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "login" => self.login(args, out).await?,
            "register" => self.register(args, out).await?,
            "logout" => {
                self.app.teardown()?;
                writeln!(out, "logged out")?;
            }
            "whoami" => match self.app.user() {
                Some(user) => writeln!(
                    out,
                    "{} ({}, id {})",
                    user.display_name(),
                    user.role,
                    user.id
                )?,
                None => writeln!(out, "not logged in")?,
            },
            "menu" => {
                for page in self.app.menu() {
                    writeln!(out, "  {:<18} {}", page.as_str(), page.label())?;
                }
            }
            "page" => {
                let [key] = args else {
                    return Err(ShellError::Usage("page <key>").into());
                };
                let page: PageKey = key.parse().map_err(ShellError::InvalidArgument)?;
                let screen = self.app.navigate(page)?;
                self.show_screen(screen, out)?;
            }
            "refresh" => {
                self.app.refresh().await?;
                writeln!(out, "refreshed")?;
            }
            "elections" => self.list_elections(out)?,
            "candidates" => self.list_candidates(out)?,
            "profile" => self.profile(args, out)?,
            "select-election" => {
                let [id] = args else {
                    return Err(ShellError::Usage("select-election <id>").into());
                };
                self.app.select_election(id)?;
                let ballot = self
                    .app
                    .store()
                    .find_election(id)
                    .map(|e| e.candidates.join(", "))
                    .unwrap_or_default();
                writeln!(out, "selected {id}; candidates: {ballot}")?;
            }
            "select-candidate" => {
                if args.is_empty() {
                    return Err(ShellError::Usage("select-candidate <name>").into());
                }
                let name = args.join(" ");
                self.app.select_candidate(&name)?;
                writeln!(out, "selected {name}")?;
            }
            "vote" => {
                self.app.request_vote()?;
                writeln!(out, "enter your phone number: phone <number>")?;
            }
            "phone" => {
                let [number] = args else {
                    return Err(ShellError::Usage("phone <number>").into());
                };
                let code = self.app.send_otp(number, &mut self.otp)?;
                writeln!(out, "OTP sent to {number}: {code}")?;
                writeln!(out, "confirm with: otp <code>")?;
            }
            "otp" => {
                let [code] = args else {
                    return Err(ShellError::Usage("otp <code>").into());
                };
                let receipt = self.app.verify_otp(code.trim()).await?;
                let message = self.app.workflow().success().unwrap_or_default();
                writeln!(out, "{message} ({} in {})", receipt.candidate, receipt.election_id)?;
            }
            "cancel" => {
                self.app.cancel_vote();
                writeln!(out, "verification cancelled")?;
            }
            "results" => self.results(out)?,
            "pending" => self.pending(out)?,
            "add-candidate" => {
                let opts = options(args)?;
                let candidate = NewCandidate {
                    name: required(&opts, "name").to_string(),
                    address: required(&opts, "address").to_string(),
                    mobile: required(&opts, "mobile").to_string(),
                    photo: optional(&opts, "photo"),
                };
                let name = candidate.name.clone();
                self.app.add_candidate(candidate).await?;
                writeln!(out, "candidate {name} added")?;
            }
            "add-election" => {
                let opts = options(args)?;
                let election = NewElection {
                    id: required(&opts, "id").to_string(),
                    kind: required(&opts, "type").to_string(),
                    candidates: required(&opts, "candidates")
                        .split(',')
                        .map(str::to_string)
                        .collect(),
                    date: required(&opts, "date").to_string(),
                };
                let id = election.id.trim().to_string();
                self.app.add_election(election).await?;
                writeln!(out, "election {id} added")?;
            }
            other => return Err(ShellError::UnknownCommand(other.to_string()).into()),
        }
        Ok(Flow::Continue)
    }

    async fn login<W: Write>(
        &mut self,
        args: &[String],
        out: &mut W,
    ) -> Result<(), CommandError> {
        let (identifier, password, role) = match args {
            [identifier, password] => (identifier, password, None),
            [identifier, password, role] => {
                let role: Role = role.parse().map_err(ShellError::InvalidArgument)?;
                (identifier, password, Some(role))
            }
            _ => return Err(ShellError::Usage("login <identifier> <password> [role]").into()),
        };
        let mut credentials = Credentials::new(identifier.as_str(), password.as_str());
        credentials.role = role;

        let session = self.app.login(&credentials).await?;
        writeln!(
            out,
            "logged in as {} ({})",
            session.user.display_name(),
            session.user.role
        )?;
        let screen = self.app.screen().map_err(AppError::from)?;
        self.show_screen(screen, out)?;
        Ok(())
    }

    async fn register<W: Write>(
        &mut self,
        args: &[String],
        out: &mut W,
    ) -> Result<(), CommandError> {
        let opts = options(args)?;
        let form = RegistrationForm {
            email: required(&opts, "email").to_string(),
            password: required(&opts, "password").to_string(),
            name: required(&opts, "name").to_string(),
            username: optional(&opts, "username"),
            confirm_password: optional(&opts, "confirm"),
            role: None,
            contact: optional(&opts, "contact"),
        };
        self.app.register(&form).await?;
        writeln!(out, "registration successful, please log in")?;
        Ok(())
    }

    fn show_screen<W: Write>(&self, screen: Screen, out: &mut W) -> std::io::Result<()> {
        let label = match screen {
            Screen::Login => "Login",
            Screen::AddCandidate => PageKey::AddCandidate.label(),
            Screen::NewElection => PageKey::NewElection.label(),
            Screen::CastVote => PageKey::CastVote.label(),
            Screen::Results => PageKey::Results.label(),
            Screen::PendingElections => PageKey::PendingElections.label(),
            Screen::Dashboard(role) => return writeln!(out, "[{role} dashboard]"),
        };
        writeln!(out, "[{label}]")
    }

    fn list_elections<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        if self.app.portal() == Portal::Election && self.app.menu().contains(&PageKey::CastVote) {
            let active = self.app.active_elections()?;
            if active.is_empty() {
                writeln!(out, "no active elections")?;
            }
            for e in active {
                let ballot = e.candidates.join(", ");
                writeln!(out, "  {} ({}, {}): {ballot}", e.id, e.kind, e.date)?;
            }
            return Ok(());
        }
        if self.app.user().is_none() {
            return Err(AppError::from(ballot_router::RouteError::NotAuthenticated).into());
        }
        for e in self.app.store().elections() {
            writeln!(
                out,
                "  {} ({}, {}) [{}]: {}",
                e.id,
                e.kind,
                e.date,
                e.status.as_str(),
                e.candidates.join(", ")
            )?;
        }
        Ok(())
    }

    fn list_candidates<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        if self.app.user().is_none() {
            return Err(AppError::from(ballot_router::RouteError::NotAuthenticated).into());
        }
        for c in self.app.store().candidates() {
            writeln!(out, "  {} ({}), {}", c.name, c.mobile, c.address)?;
        }
        Ok(())
    }

    fn profile<W: Write>(&self, args: &[String], out: &mut W) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(ShellError::Usage("profile <name>").into());
        }
        let name = args.join(" ");
        match self.app.candidate_profile(&name)? {
            Some(c) => {
                writeln!(out, "{}", c.name)?;
                writeln!(out, "  address: {}", c.address)?;
                writeln!(out, "  mobile:  {}", c.mobile)?;
                if c.photo.is_some() {
                    writeln!(out, "  photo:   on file")?;
                }
            }
            None => writeln!(out, "no profile found for {name}")?,
        }
        Ok(())
    }

    fn results<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        let results = self.app.results()?;
        if results.is_empty() {
            writeln!(out, "no results yet")?;
        }
        for summary in results {
            writeln!(
                out,
                "{} ({}, {}): {} votes across {} candidates",
                summary.election_id,
                summary.kind,
                summary.date,
                summary.total_votes,
                summary.candidate_count
            )?;
            for standing in &summary.standings {
                writeln!(
                    out,
                    "  {:<20} {:>5}  {:>5.1}%",
                    standing.candidate, standing.votes, standing.percentage
                )?;
            }
            if let Some(winner) = &summary.winner {
                writeln!(
                    out,
                    "  winner: {} with {} votes ({:.1}%)",
                    winner.candidate, winner.votes, winner.percentage
                )?;
            }
        }
        Ok(())
    }

    fn pending<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        let view = self.app.pending(self.today)?;
        writeln!(out, "pending:")?;
        for e in &view.pending {
            writeln!(out, "  {} ({}, {})", e.id, e.kind, e.date)?;
        }
        writeln!(out, "upcoming:")?;
        for (e, days) in &view.upcoming {
            let unit = if *days == 1 { "day" } else { "days" };
            writeln!(out, "  {} ({}) in {days} {unit}", e.id, e.date)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::{ApiCall, Endpoint, NullElectionApi, NullOtp, NullStorage};
    use ballot_types::{Election, ElectionStatus, VoteTally};

    #[test]
    fn tokenizer_handles_quotes() {
        assert_eq!(
            tokenize(r#"add-candidate name="Jane Doe" address='1 Main St' mobile=555"#).unwrap(),
            vec![
                "add-candidate",
                "name=Jane Doe",
                "address=1 Main St",
                "mobile=555"
            ]
        );
        assert_eq!(tokenize("  ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"profile """#).unwrap(), vec!["profile", ""]);
        assert_eq!(tokenize(r#"say "oops"#), Err(ShellError::UnterminatedQuote));
    }

    #[test]
    fn options_require_key_value() {
        let words = vec!["a=1".to_string(), "b=x=y".to_string()];
        let opts = options(&words).unwrap();
        assert_eq!(opts.get("b"), Some(&"x=y"));
        assert!(options(&["loose".to_string()]).is_err());
    }

    fn backend() -> NullElectionApi {
        let done = Election {
            id: "E0".into(),
            kind: "General".into(),
            candidates: vec!["Alice".into(), "Bob".into()],
            date: "2024-11-05".into(),
            status: ElectionStatus::Completed,
            votes: Some(VoteTally::from([
                ("Alice".to_string(), 3),
                ("Bob".to_string(), 5),
            ])),
        };
        let open = Election {
            id: "E1".into(),
            status: ElectionStatus::Active,
            votes: None,
            date: "2025-11-05".into(),
            ..done.clone()
        };
        NullElectionApi::new()
            .with_user("admin@ballot.test", "secret", Role::Admin, "Ada")
            .with_user("voter@ballot.test", "pw", Role::Voter, "Vic")
            .with_election(done)
            .with_election(open)
    }

    async fn run(api: NullElectionApi, script: &str) -> String {
        let app = AppState::new(Portal::Election, api, NullStorage::new());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut shell = Shell::new(app, NullOtp::constant(246_810), today);
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn voter_casts_a_vote() {
        let api = backend();
        let output = run(
            api.clone(),
            "login voter@ballot.test pw\n\
             select-election E1\n\
             select-candidate Alice\n\
             vote\n\
             phone 5551234567\n\
             otp 000000\n\
             otp 246810\n",
        )
        .await;

        assert!(output.contains("logged in as Vic (voter)"), "{output}");
        assert!(output.contains("OTP sent to 5551234567: 246810"), "{output}");
        assert!(output.contains("error: invalid OTP, please try again"), "{output}");
        assert!(output.contains("Your vote has been cast successfully!"), "{output}");
        assert_eq!(api.call_count(Endpoint::CastVote), 1);
        assert!(api.calls().contains(&ApiCall::CastVote {
            election_id: "E1".into(),
            candidate: "Alice".into()
        }));
    }

    #[tokio::test]
    async fn quoted_code_is_trimmed_before_checking() {
        let api = backend();
        let output = run(
            api.clone(),
            "login voter@ballot.test pw\n\
             select-election E1\n\
             select-candidate Alice\n\
             vote\n\
             phone 5551234567\n\
             otp \" 246810 \"\n",
        )
        .await;

        assert!(output.contains("Your vote has been cast successfully!"), "{output}");
        assert_eq!(api.call_count(Endpoint::CastVote), 1);
    }

    #[tokio::test]
    async fn results_show_winner_and_percentages() {
        let output = run(backend(), "login voter@ballot.test pw\nresults\n").await;
        assert!(output.contains("E0 (General, 2024-11-05): 8 votes across 2 candidates"));
        assert!(output.contains("winner: Bob with 5 votes (62.5%)"), "{output}");
    }

    #[tokio::test]
    async fn voter_is_refused_admin_pages() {
        let api = backend();
        let output = run(
            api.clone(),
            "login voter@ballot.test pw\npage add-candidate\n\
             add-candidate name=Carol address=x mobile=1\n",
        )
        .await;
        assert!(output.contains("not available to the voter role"), "{output}");
        assert_eq!(api.call_count(Endpoint::AddCandidate), 0);
    }

    #[tokio::test]
    async fn admin_adds_an_election() {
        let api = backend();
        let output = run(
            api.clone(),
            "login admin@ballot.test secret\n\
             add-election id=E9 type=Local date=2026-02-01 candidates=Carol\n\
             add-election id=E9 type=Local date=2026-02-01 candidates=Carol,Dan\n",
        )
        .await;
        assert!(output.contains("error: "), "{output}");
        assert!(output.contains("election E9 added"), "{output}");
        assert_eq!(api.call_count(Endpoint::AddElection), 1);
    }

    #[tokio::test]
    async fn commands_need_a_session() {
        let output = run(backend(), "results\nbogus\nquit\nwhoami\n").await;
        assert!(output.contains("error: please log in first"), "{output}");
        assert!(output.contains("unknown command: bogus"), "{output}");
        assert!(!output.contains("not logged in"), "quit should stop the loop: {output}");
    }
}
