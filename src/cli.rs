//! Command-line surface: argument parsing and command dispatch.

use crate::browser::{BrowserSession, CdpSession};
use crate::config;
use crate::workflow::{Credentials, DatabaseCredentialSet, WorkflowEngine, WorkflowSettings};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "vws-web",
    version,
    about = "Commands for interacting with the VWS developer console"
)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Run the browser without a window
    #[arg(long, global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    #[arg(long, env = "VWS_EMAIL_ADDRESS")]
    pub email_address: String,

    #[arg(long, env = "VWS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl From<&CredentialArgs> for Credentials {
    fn from(args: &CredentialArgs) -> Self {
        Credentials::new(args.email_address.clone(), args.password.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a license.
    #[command(alias = "create-vws-license")]
    CreateLicense {
        #[arg(long)]
        license_name: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Create a database.
    #[command(alias = "create-vws-database")]
    CreateDatabase {
        #[arg(long)]
        license_name: String,

        #[arg(long)]
        database_name: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Show the details of a database.
    ShowDatabaseDetails {
        #[arg(long)]
        database_name: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Install the stderr log subscriber. stdout is reserved for command output.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

pub async fn run(cli: Cli) -> Result<()> {
    if let Command::InitConfig { force } = &cli.command {
        let path = cli.config.clone().unwrap_or_else(config::get_config_path);
        config::init_config(&path, *force)?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = config::load_config(cli.config.as_deref())?;
    if cli.headless {
        config.browser.headless = true;
    }

    let settings = WorkflowSettings::from_config(&config);
    let mut session = CdpSession::launch(&config.browser).await?;

    let result = match &cli.command {
        Command::CreateLicense {
            license_name,
            credentials,
        } => create_license(&session, settings, &credentials.into(), license_name)
            .await
            .context("create-license failed"),
        Command::CreateDatabase {
            license_name,
            database_name,
            credentials,
        } => create_database(
            &session,
            settings,
            &credentials.into(),
            database_name,
            license_name,
        )
        .await
        .context("create-database failed"),
        Command::ShowDatabaseDetails {
            database_name,
            credentials,
        } => show_database_details(&session, settings, &credentials.into(), database_name)
            .await
            .context("show-database-details failed")
            .and_then(|details| {
                print!("{}", details.to_yaml()?);
                Ok(())
            }),
        Command::InitConfig { .. } => unreachable!("handled above"),
    };

    // The browser goes away whatever the outcome
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }
    result
}

async fn create_license<S: BrowserSession + ?Sized>(
    session: &S,
    settings: WorkflowSettings,
    credentials: &Credentials,
    license_name: &str,
) -> crate::error::Result<()> {
    let engine = WorkflowEngine::new(session, settings);
    engine.log_in(credentials).await?;
    engine.create_license(license_name).await
}

async fn create_database<S: BrowserSession + ?Sized>(
    session: &S,
    settings: WorkflowSettings,
    credentials: &Credentials,
    database_name: &str,
    license_name: &str,
) -> crate::error::Result<()> {
    let engine = WorkflowEngine::new(session, settings);
    engine.log_in(credentials).await?;
    engine.create_database(database_name, license_name).await
}

async fn show_database_details<S: BrowserSession + ?Sized>(
    session: &S,
    settings: WorkflowSettings,
    credentials: &Credentials,
    database_name: &str,
) -> crate::error::Result<DatabaseCredentialSet> {
    let engine = WorkflowEngine::new(session, settings);
    engine.log_in(credentials).await?;
    engine.get_database_details(database_name).await
}
