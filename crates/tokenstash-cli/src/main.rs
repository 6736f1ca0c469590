//! tokenstash - inspect and manage stored session tokens.
//!
//! Reads the same directory a service writes through `SessionTokenStore`,
//! so operators can list sessions, look at a record or revoke it locally.

mod format;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tokenstash_core::store::record::parse_expiry;
use tokenstash_core::{OAuthCredential, SessionId, SessionTokenStore, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "tokenstash", version, about = "Manage per-session OAuth2 token files")]
struct Cli {
    /// Token directory (defaults to $TOKENSTASH_DIR, then the user cache dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sessions with a stored token
    List,
    /// Print a stored record with its tokens masked
    Show { session: SessionId },
    /// Store a token record for a session
    Save {
        session: SessionId,
        #[arg(long)]
        email: String,
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
        /// Expiry as an RFC 3339 timestamp
        #[arg(long)]
        expires_at: Option<String>,
        /// Granted scope, repeat for several
        #[arg(long = "scope")]
        scopes: Vec<String>,
    },
    /// Remove the record for a session
    Delete { session: SessionId },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .context("Log file path has no file name")?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    Ok(guard)
}

fn open_store(dir: Option<PathBuf>) -> Result<SessionTokenStore> {
    let mut config = StoreConfig::from_env().context("Failed to resolve token directory")?;
    if let Some(dir) = dir {
        config.base_dir = dir;
    }
    debug!(dir = %config.base_dir.display(), "Using token directory");
    Ok(SessionTokenStore::new(config))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let store = open_store(cli.dir)?;

    match cli.command {
        Command::List => {
            for session in store.list_sessions()? {
                println!("{}", session);
            }
        }
        Command::Show { session } => match store.load_record(session.as_str())? {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&format::masked_record(&record))?);
            }
            None => {
                eprintln!("No token stored for session {}", session);
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Save {
            session,
            email,
            access_token,
            refresh_token,
            expires_at,
            scopes,
        } => {
            let mut credential = OAuthCredential::new(access_token).with_scopes(scopes);
            credential.refresh_token = refresh_token;
            if let Some(ref value) = expires_at {
                let expiry = parse_expiry(value)
                    .with_context(|| format!("Invalid --expires-at value: {}", value))?;
                credential = credential.with_expiry(expiry);
            }
            store
                .save(session.as_str(), &email, &credential)
                .with_context(|| format!("Failed to save token for session {}", session))?;
            println!("Saved token for session {}", session);
        }
        Command::Delete { session } => {
            if store.delete(session.as_str())? {
                println!("Deleted token for session {}", session);
            } else {
                println!("No token stored for session {}", session);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;
    info!("tokenstash starting");

    run(cli)
}
