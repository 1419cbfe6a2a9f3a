//! WAGERBOOK: settlement CLI.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the ledger from disk (or creates a fresh one), and runs the
//! requested command.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use wagerbook::cli::{self, Cli, Commands, LedgerArg};
use wagerbook::config::AppConfig;
use wagerbook::engine::validator::InputValidator;
use wagerbook::engine::SettlementEngine;
use wagerbook::storage::JsonFileStore;

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load_or_default(&cli.config)?;

    init_logging();

    match cli.command {
        Commands::Settle(args) => {
            let store = ledger_store(&cfg, &args.ledger);
            let raw = cli::read_market(&args.market)?;
            let engine = SettlementEngine::new(InputValidator::new(cfg.settlement.clone()));

            let (report, ledger) =
                cli::run_settle(&engine, &store, &raw, &args.outcome, args.dry_run)?;

            info!(report = %report, "Settlement complete");
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!("{}", ledger.titles());
        }
        Commands::Standings(args) => {
            let store = ledger_store(&cfg, &args);
            let ledger = cli::run_standings(&store)?;
            if ledger.is_empty() {
                println!("No players yet.");
            } else {
                print!("{ledger}");
            }
        }
    }

    Ok(())
}

fn ledger_store(cfg: &AppConfig, arg: &LedgerArg) -> JsonFileStore {
    match &arg.path {
        Some(path) => JsonFileStore::new(path.clone()),
        None => JsonFileStore::new(cfg.storage.ledger_path.clone()),
    }
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout stays
/// machine-readable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wagerbook=info"));

    let json_logging = std::env::var("WAGERBOOK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
