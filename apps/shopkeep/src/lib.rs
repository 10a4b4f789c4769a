//! # Shopkeep Library
//!
//! Application layer for the Shopkeep wholesale ledger: state, commands
//! and startup.
//!
//! ## Module Organization
//! ```text
//! shopkeep_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── ledger.rs   ◄─── Ledger store, id generator, clock
//! │   ├── cart.rs     ◄─── Sales and purchase carts
//! │   ├── catalog.rs  ◄─── Product catalog
//! │   └── config.rs   ◄─── Shop profile
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── catalog.rs  ◄─── Product list/search
//! │   ├── billing.rs  ◄─── Sales cart and invoices
//! │   ├── purchase.rs ◄─── Purchase cart
//! │   ├── history.rs  ◄─── Records, statistics, profit/loss
//! │   └── config.rs   ◄─── Shop profile
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! The binary opens the ledger and prints the dashboard summary as JSON.
//! Pages drive the same commands through this library.

pub mod commands;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shopkeep_db::{Database, DbConfig};
use state::{ConfigState, LedgerState};

/// Command-line flags for the `shopkeep` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// `--db <PATH>`; falls back to [`database_path`]
    pub db_path: Option<PathBuf>,
    /// `--from <YYYY-MM-DD>`
    pub from: Option<String>,
    /// `--to <YYYY-MM-DD>`
    pub to: Option<String>,
    pub help: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),
}

const USAGE: &str = "\
Shopkeep wholesale ledger

Usage: shopkeep [OPTIONS]

Options:
  -d, --db <PATH>     Database file path (default: app data directory)
      --from <DATE>   Start of profit/loss period (YYYY-MM-DD)
      --to <DATE>     End of profit/loss period (YYYY-MM-DD)
  -h, --help          Show this help message";

impl CliOptions {
    /// Parses flags, skipping the program name in `args[0]`.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut options = CliOptions::default();
        let mut iter = args.iter().skip(1);

        while let Some(flag) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| CliError::MissingValue(flag.clone()))
            };

            match flag.as_str() {
                "--db" | "-d" => options.db_path = Some(PathBuf::from(value()?)),
                "--from" => options.from = Some(value()?),
                "--to" => options.to = Some(value()?),
                "--help" | "-h" => options.help = true,
                other => return Err(CliError::UnknownFlag(other.to_string())),
            }
        }

        Ok(options)
    }
}

/// Runs the application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Parse flags ──────────────────────────────────────────────────────► │
/// │     • --help prints usage and stops                                     │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: INFO, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  3. Determine Database Path ──────────────────────────────────────────► │
/// │     • --db flag, then SHOPKEEP_DB_PATH, then the app data directory     │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  5. Print the dashboard summary ──────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let options = CliOptions::parse(&args)?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    init_tracing();

    let config = ConfigState::from_env();
    info!(business = %config.business_name, "Starting Shopkeep");

    let db_path = match options.db_path {
        Some(path) => path,
        None => database_path()?,
    };
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let ledger = LedgerState::new(db.kv());
    let summary = commands::history::get_dashboard(&ledger, options.from, options.to).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "Profit/loss: {} ({}% margin)",
        config.format_currency(summary.profit_loss.profit_loss),
        summary.profit_loss.margin
    );

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopkeep=trace` - Show trace for the app only
/// - Default: INFO, DEBUG for the app
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopkeep=debug,sqlx=warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.shopkeep.ledger/shopkeep.db`
/// - **Windows**: `%APPDATA%\shopkeep\ledger\data\shopkeep.db`
/// - **Linux**: `~/.local/share/ledger/shopkeep.db`
///
/// ## Development Override
/// Set `SHOPKEEP_DB_PATH` to use a custom path.
pub fn database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("SHOPKEEP_DB_PATH") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let proj_dirs = ProjectDirs::from("com", "shopkeep", "ledger")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("shopkeep.db"))
}
