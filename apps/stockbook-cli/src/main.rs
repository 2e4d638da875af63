//! # Stockbook Operator CLI
//!
//! ## Startup Sequence
//! 1. Load `.env` (if present)
//! 2. Load configuration (defaults → file → environment → `--database`)
//! 3. Initialize tracing (logging to stderr)
//! 4. Open the ledger and run migrations
//! 5. Run the command, print JSON on stdout
//! 6. Close the pool
//!
//! ## Exit Codes
//! ```text
//! 0  success
//! 1  configuration or internal failure
//! 2  INVALID_REQUEST     3  NOT_FOUND        4  INSUFFICIENT_STOCK
//! 5  QUOTA_EXCEEDED      6  BUSY (after retries)
//! ```

mod cli;
mod commands;
mod config;
mod seed;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use stockbook_core::ErrorKind;
use stockbook_db::{Database, LedgerError};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        },
        Err(err) => report_failure(&err),
    }
}

async fn run(cli: Cli) -> Result<Value> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.database {
        config.database.path = Some(path);
    }

    init_tracing(&config);

    let db_config = config.db_config()?;
    info!(path = ?db_config.database_path, "Opening ledger");
    let db = Database::new(db_config).await?;

    let result = commands::run(&db, &config, cli.command).await;

    db.close().await;
    debug!("Ledger closed");

    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the failure on stderr and picks the exit code.
fn report_failure(err: &anyhow::Error) -> ExitCode {
    let Some(ledger) = err.downcast_ref::<LedgerError>() else {
        eprintln!("error: {err:#}");
        return ExitCode::from(1);
    };

    match serde_json::to_string_pretty(&ledger.report()) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("error: {ledger}"),
    }
    ExitCode::from(exit_code(ledger.kind()))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::InvalidRequest => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::InsufficientStock => 4,
        ErrorKind::QuotaExceeded => 5,
        ErrorKind::Busy => 6,
    }
}
