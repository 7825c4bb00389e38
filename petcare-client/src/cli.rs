use std::io;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::auth::{CredentialResolver, TokenStore};
use crate::commands::{self, Console};
use crate::config::Config;
use crate::output::OutputMode;
use crate::server::{ApiClient, LockMode, PetLocation};
use crate::session::Session;
use crate::tui::table::terminal_width;
use crate::util;

/// Shared by `--version` and `petcare version`.
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nBuild: ",
    env!("GIT_COMMIT"),
    "\nRust: ",
    env!("RUSTC_VERSION"),
    "\nPlatform: ",
    env!("BUILD_PLATFORM"),
);

#[derive(Parser)]
#[command(name = "petcare")]
#[command(version, long_version = LONG_VERSION, about = "petcare - Sure Petcare flaps, feeders and pets from the terminal", long_about = None)]
struct Cli {
    /// Print the raw JSON payload instead of a table
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Token to use instead of the environment or the token file
    #[arg(short = 't', long = "token")]
    token: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct TokenArg {
    /// Token for this command only
    #[arg(short = 't', long = "token")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store a fresh token
    Token {
        /// Account email
        #[arg(short = 'u', long = "user")]
        user: String,

        /// Account password
        #[arg(short = 'p', long = "password")]
        password: String,
    },

    /// List pets and where they are
    Pets {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// List hubs, flaps and feeders
    Devices {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// Show recent flap movements
    Report {
        /// Household ID
        #[arg(long = "household")]
        household: u64,

        /// Limit the report to one pet
        #[arg(long = "pet")]
        pet: Option<u64>,

        #[command(flatten)]
        auth: TokenArg,
    },

    /// Show account notifications
    Notification {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// Change the lock mode of a flap
    Locking {
        /// Flap ID
        #[arg(long = "device")]
        device: u64,

        #[arg(long = "mode", value_enum)]
        mode: LockArg,

        #[command(flatten)]
        auth: TokenArg,
    },

    /// Tell the service where a pet is
    Position {
        /// Pet ID
        #[arg(long = "pet")]
        pet: u64,

        #[arg(long = "position", value_enum)]
        position: PositionArg,

        #[command(flatten)]
        auth: TokenArg,
    },

    /// Show CLI version information
    Version,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LockArg {
    /// Nobody in or out
    Lock,
    /// Pets may leave but not come in
    In,
    /// Pets may come in but not leave
    Out,
    Unlock,
}

impl From<LockArg> for LockMode {
    fn from(arg: LockArg) -> Self {
        match arg {
            LockArg::Lock => LockMode::Locked,
            LockArg::In => LockMode::LockedIn,
            LockArg::Out => LockMode::LockedOut,
            LockArg::Unlock => LockMode::Unlocked,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PositionArg {
    In,
    Out,
}

impl From<PositionArg> for PetLocation {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::In => PetLocation::Inside,
            PositionArg::Out => PetLocation::Outside,
        }
    }
}

impl Commands {
    /// The per-command `-t`, if this command takes one.
    fn token(&self) -> Option<&str> {
        match self {
            Commands::Pets { auth }
            | Commands::Devices { auth }
            | Commands::Report { auth, .. }
            | Commands::Notification { auth }
            | Commands::Locking { auth, .. }
            | Commands::Position { auth, .. } => auth.token.as_deref(),
            Commands::Token { .. } | Commands::Version => None,
        }
    }
}

pub async fn cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("Version: {}", LONG_VERSION);
        return Ok(());
    }

    let config = Config::load()?;
    util::logging::init_logging(&config.log_level);
    util::format::init_styling(cli.no_color);

    let resolver = CredentialResolver::new(TokenStore::new(config.token_file_path()?));
    let mut console = Console::new(
        io::stdout().lock(),
        OutputMode::from_json_flag(cli.json),
        terminal_width(),
    );

    if let Commands::Token { user, password } = &cli.command {
        let api = ApiClient::new(&config.api_url, &config.client_device_id, None)?;
        let session = Session::open(api);
        return commands::token(&session, &mut console, &resolver, user, password).await;
    }

    // subcommand flag first, then the global one
    let explicit = cli.command.token().or(cli.token.as_deref());
    let credential = resolver.resolve(explicit)?;
    debug!("Using token from {}", credential.source());

    let api = ApiClient::new(
        &config.api_url,
        &config.client_device_id,
        Some(credential.token().to_string()),
    )?;
    let session = Session::open(api);

    match cli.command {
        Commands::Pets { .. } => commands::pets(&session, &mut console).await,
        Commands::Devices { .. } => commands::devices(&session, &mut console).await,
        Commands::Report { household, pet, .. } => {
            commands::report(&session, &mut console, household, pet, Utc::now()).await
        }
        Commands::Notification { .. } => commands::notifications(&session, &mut console).await,
        Commands::Locking { device, mode, .. } => {
            commands::lock(&session, &mut console, device, mode.into())
                .await
                .map(|_| ())
        }
        Commands::Position { pet, position, .. } => {
            commands::position(&session, &mut console, pet, position.into())
                .await
                .map(|_| ())
        }
        Commands::Token { .. } | Commands::Version => Ok(()),
    }
}
