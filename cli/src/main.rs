//! Carelog CLI - replays JSON call scripts against a fresh session ledger.
//!
//! ```text
//! carelog replay <script.json> [--config <path>] [--admin <principal>]
//! ```
//!
//! Each call prints one JSON line on stdout. A final line lists the fee
//! transfers the ledger requested. Logs go to stderr, filtered by `RUST_LOG`.

mod script;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use carelog_config::CarelogConfig;
use carelog_core::SessionLedger;
use carelog_types::Principal;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the call results.
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[derive(Debug, Parser)]
#[command(name = "carelog")]
#[command(about = "Replay JSON call scripts against a fresh session ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Execute a script and print one JSON result line per call
    Replay {
        /// JSON array of calls
        script: PathBuf,
        /// Config file to use instead of ~/.carelog/config.toml
        #[arg(long)]
        config: Option<PathBuf>,
        /// Admin principal, overriding the configured one
        #[arg(long)]
        admin: Option<String>,
    },
}

fn load_config(explicit: Option<&Path>) -> Result<CarelogConfig> {
    let loaded = match explicit {
        Some(path) => {
            let config = CarelogConfig::load_from(path)?;
            if config.is_none() {
                bail!("config file {} does not exist", path.display());
            }
            config
        }
        None => CarelogConfig::load()?,
    };
    Ok(loaded.unwrap_or_default())
}

fn replay(script_path: &Path, config: Option<&Path>, admin: Option<Principal>) -> Result<()> {
    let config = load_config(config)?;
    let settings = config
        .ledger_settings(admin)
        .context("cannot build ledger settings (set [ledger].admin or pass --admin)")?;

    let json = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let steps = script::parse(&json)?;

    tracing::info!(
        script = %script_path.display(),
        steps = steps.len(),
        admin = %settings.admin(),
        "Replaying script"
    );

    let mut ledger = SessionLedger::with_transfer_log(settings);
    let outcomes = script::replay(&mut ledger, &steps)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for outcome in &outcomes {
        serde_json::to_writer(&mut out, outcome)?;
        writeln!(out)?;
    }
    let transfers = serde_json::json!({ "transfers": ledger.transfers().records() });
    serde_json::to_writer(&mut out, &transfers)?;
    writeln!(out)?;
    out.flush()?;

    tracing::info!(
        sessions = ledger.session_count(),
        rejected = outcomes.iter().filter(|outcome| !outcome.ok).count(),
        "Replay finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    match cli.command {
        Command::Replay {
            script,
            config,
            admin,
        } => replay(&script, config.as_deref(), admin.map(Principal::new)),
    }
}
