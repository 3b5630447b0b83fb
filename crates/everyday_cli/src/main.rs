//! Command-line entry point.
//!
//! # Responsibility
//! - Expose the recovery merge tool outside the app.
//! - Keep output plain text, one fact per line.

use clap::{Args, Parser, Subcommand};
use everyday_core::{init_logging_for, run_recovery, StoreConfig};
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "everyday", version, about = "EveryDay workspace utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the core library version
    Version,
    /// Merge blocks from the corrupted-store backup into the live store
    #[command(visible_alias = "restore")]
    Recovery(RecoveryArgs),
}

#[derive(Args)]
struct RecoveryArgs {
    /// Data directory holding the store files (defaults to the per-user one)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Version => {
            println!("everyday_core version={}", everyday_core::core_version());
            ExitCode::SUCCESS
        }
        Command::Recovery(args) => recover(args),
    }
}

fn recover(args: RecoveryArgs) -> ExitCode {
    let config = match args.data_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::resolve(),
    };
    if let Err(err) = init_logging_for(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    println!("backup: {}", config.backup_path().display());
    println!("live:   {}", config.db_path().display());

    match run_recovery(&config) {
        Ok(report) => {
            println!("recovered: {}", report.recovered);
            println!("skipped:   {}", report.skipped);
            println!("failed:    {}", report.failed);
            println!("stats:     {}", if report.stats_recovered { "restored" } else { "kept" });
            for failure in &report.failures {
                warn!("event=recovery_cli module=cli status=item_failed doc_id={}", failure.id);
                println!("  failed {}: {}", failure.id, failure.message);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("recovery failed: {err}");
            ExitCode::FAILURE
        }
    }
}
