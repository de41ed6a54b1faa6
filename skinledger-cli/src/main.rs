//! SkinLedger CLI
//!
//! Opens the snapshot store, runs one report and prints it as JSON.

mod args;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use skinledger_services::{LedgerService, SnapshotStore};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Cli, Command};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,skinledger=debug")),
        )
        .init();

    let now = Utc::now();
    let filter = cli.filter(now)?;

    info!("Opening snapshot store at: {}", cli.db);
    let store = SnapshotStore::new(&cli.db)
        .with_context(|| format!("Failed to open database at {}", cli.db))?;
    let ledger = LedgerService::new(store);

    info!(
        "Running {:?} for [{}, {}) on {}",
        cli.command,
        filter.from,
        filter.to,
        filter
            .platform
            .map(|p| p.display_name())
            .unwrap_or("all platforms")
    );

    match cli.command {
        Command::Summary => print_json(&ledger.summary(&filter)?),
        Command::Profit => print_json(&ledger.profit_table(&filter)?),
        Command::Inventory => print_json(&ledger.inventory_on(filter.platform)?),
        Command::Holds => {
            let view = ledger.lifecycle(now)?;
            let unlocks: Vec<_> = view
                .unlock_countdown(now)
                .into_iter()
                .map(|(id, left)| json!({ "trade_id": id, "hours_left": left.map(|d| d.num_hours()) }))
                .collect();
            print_json(&json!({ "holdings": view, "unlocks": unlocks }))
        }
        Command::Daily => print_json(&ledger.daily_series(&filter)?),
        Command::Dashboard => print_json(&ledger.dashboard(&filter)?),
        Command::Matches => {
            let report = ledger.match_report()?;
            print_json(&json!({
                "pass_counts": report.pass_counts,
                "matched": report.pass_counts.total(),
                "unconvertible": report.unconvertible_count(),
                "skipped_missing_price": report.skipped_missing_price,
                "skipped_missing_item": report.skipped_missing_item,
            }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", out);
    Ok(())
}
