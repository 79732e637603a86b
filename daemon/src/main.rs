//! `ballot`: development backend and interactive client for the election
//! and insurance portals.

mod config;
mod shell;

use std::path::PathBuf;

use anyhow::Context;
use ballot_client::ApiClient;
use ballot_router::AppState;
use ballot_rpc::RpcServer;
use ballot_session::FileStorage;
use ballot_types::Portal;
use ballot_utils::{init_logging, LogFormat};
use ballot_workflow::RandomOtp;
use clap::Parser;
use tokio::io::BufReader;

use crate::config::ClientConfig;
use crate::shell::Shell;

#[derive(Parser)]
#[command(name = "ballot", about = "Election voting client and development backend")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Backend base URL.
    #[arg(long, env = "BALLOT_API_URL", global = true)]
    api_url: Option<String>,

    /// Portal to run as: "election" or "insurance".
    #[arg(long, env = "BALLOT_PORTAL", global = true)]
    portal: Option<Portal>,

    /// Session file used by the insurance portal.
    #[arg(long, env = "BALLOT_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the in-memory development backend.
    Serve {
        /// Port to listen on.
        #[arg(long, env = "BALLOT_PORT")]
        port: Option<u16>,
    },
    /// Start the interactive client.
    Shell,
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// File settings (or defaults) with flags applied on top.
    fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(portal) = self.portal {
            config.portal = portal;
        }
        if let Some(path) = &self.session_file {
            config.session_file = path.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Command::Serve { port: Some(port) } = self.command {
            config.server.port = port;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Serve { .. } => {
            tracing::info!(port = config.server.port, "starting development backend");
            let server = RpcServer::new(&config.server)?;
            server.start().await?;
        }
        Command::Shell => {
            let api = ApiClient::with_timeouts(
                &config.api_url,
                config.request_timeout(),
                config.connect_timeout(),
            )?;
            let storage = FileStorage::new(&config.session_file);
            let app = AppState::new(config.portal, api, storage);
            let today = chrono::Local::now().date_naive();
            let mut shell = Shell::new(app, RandomOtp, today);

            tracing::info!(api = %config.api_url, portal = config.portal.as_str(), "shell started");
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            shell.run(stdin, &mut stdout).await?;
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
