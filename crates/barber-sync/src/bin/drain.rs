//! # Buffer Drain
//!
//! Runs one synchronization pass over the offline visit buffer.
//!
//! ## Usage
//! ```bash
//! # Use barber.toml from the platform config dir
//! cargo run -p barber-sync --bin drain
//!
//! # Explicit config file, JSON report
//! cargo run -p barber-sync --bin drain -- --config ./barber.toml --json
//!
//! # Only show what is pending
//! cargo run -p barber-sync --bin drain -- --list
//! ```
//!
//! Exit code is 0 when every pending visit was delivered, 2 when some
//! visits stayed buffered, 1 on a fatal error. Service prices are fetched
//! before the pass; if they can't be, nothing is sent and the exit code is 1.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use barber_db::Database;
use barber_sync::{OfflineVisitBuffer, SupabaseClient, SyncConfig, SyncReport};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    config: Option<PathBuf>,
    json: bool,
    list_only: bool,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config: None,
        json: false,
        list_only: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" => parsed.json = true,
            "--list" | "-l" => parsed.list_only = true,
            "--help" | "-h" => {
                println!("Barber POS buffer drain");
                println!();
                println!("Usage: drain [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("      --json           Print the report as JSON");
                println!("  -l, --list           List pending visits without syncing");
                println!("  -h, --help           Show this help message");
                return None;
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    Some(parsed)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,barber=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let Some(args) = parse_args() else {
        return ExitCode::SUCCESS;
    };

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "Drain failed");
            ExitCode::FAILURE
        }
    }
}

/// Returns Ok(true) when nothing is left in the buffer.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = SyncConfig::load(args.config)?;

    let db = Database::open(config.db_config()?).await?;
    let schema = db.schema_status().await?;
    let buffer = OfflineVisitBuffer::from_database(&db, config.record_name());

    let pending = buffer.list().await?;
    info!(
        path = %config.database_path()?.display(),
        migrations = schema.applied,
        pending = pending.len(),
        "Opened buffer"
    );

    if args.list_only {
        for (index, visit) in pending.iter().enumerate() {
            println!(
                "{index:>3}  {}  {}  {:>10}  services={}  parent={}",
                visit.local_id,
                visit.created_at.format("%Y-%m-%d %H:%M"),
                visit.total().to_string(),
                visit.services.len(),
                visit.remote_visit_id.as_deref().unwrap_or("-"),
            );
        }
        db.close().await;
        return Ok(pending.is_empty());
    }

    let client = SupabaseClient::from_settings(&config.remote)?;

    let report = match sync_pass(&buffer, &client).await {
        Ok(report) => report,
        Err(e) => {
            db.close().await;
            return Err(e);
        }
    };
    print_report(&report, args.json)?;

    let remaining = buffer.len().await?;
    db.close().await;

    Ok(remaining == 0)
}

/// Fetches current service prices, then runs one synchronization pass.
///
/// Line items are priced from the catalog, so no pass runs without one.
async fn sync_pass(
    buffer: &OfflineVisitBuffer,
    client: &SupabaseClient,
) -> Result<SyncReport, Box<dyn std::error::Error>> {
    let catalog = client
        .service_catalog()
        .await
        .map_err(|e| format!("Could not fetch service prices, nothing was sent: {e}"))?;

    info!(services = catalog.len(), "Fetched service prices");
    Ok(buffer.synchronize(client, &catalog).await?)
}

fn print_report(report: &SyncReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "Delivered {} of {} buffered visits",
        report.succeeded.len(),
        report.attempted()
    );
    for (index, failure) in &report.failed {
        println!(
            "  #{index} {} failed at {}: {}",
            failure.local_id, failure.stage, failure.reason
        );
    }

    Ok(())
}
