use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;

mod config;
mod error;
mod ingest;
mod logging;
mod models;
mod notify;
mod render;
mod report;
mod sheet;
mod store;

use config::AppConfig;
use error::LedgerError;
use models::RawRow;
use render::PageConfig;
use store::PgRecordStore;

#[derive(Parser)]
#[command(name = "alumni-ledger")]
#[command(about = "Alumni record ingestion and status reports for AlumConnect", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a handful of sample alumni
    Seed {
        /// Print the inserted/skipped counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import alumni from a spreadsheet exported as CSV
    Import {
        #[arg(long)]
        csv: PathBuf,
        /// Print the inserted/skipped counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the PDF status report
    Report {
        #[arg(long, default_value = report::REPORT_FILENAME)]
        out: PathBuf,
    },
    /// Draft an update-request email for one alumnus
    RequestUpdate {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "update_request.eml")]
        out: PathBuf,
    },
}

fn seed_rows() -> Vec<RawRow> {
    let rows = [
        json!({"slNo": 1, "name": "Avery Lee", "company": "Northwind", "email": "avery.lee@example.com", "batch": 2019, "status": "Employed"}),
        json!({"slNo": 2, "name": "Jules Moreno", "company": "Contoso", "email": "jules.moreno@example.com", "batch": 2020, "status": "Employed"}),
        json!({"slNo": 3, "name": "Kiara Patel", "company": "State University", "email": "kiara.patel@example.com", "batch": 2021, "status": "Higher Studies"}),
        json!({"slNo": 4, "name": "Noah Kim", "company": "Kim Labs", "email": "noah.kim@example.com", "batch": 2018, "status": "Entrepreneur"}),
    ];
    rows.into_iter()
        .filter_map(|row| row.as_object().cloned())
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgRecordStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            store::postgres::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { json } => {
            let summary = ingest::ingest(&store, seed_rows(), config.name_match).await?;
            if json {
                println!("{}", serde_json::to_string(&summary)?);
                return Ok(());
            }
            println!(
                "Seeded {} records ({} already present).",
                summary.inserted, summary.skipped
            );
        }
        Commands::Import { csv, json } => {
            let rows = sheet::read_rows(&csv)
                .with_context(|| format!("failed to read {}", csv.display()))?;
            let summary = ingest::ingest(&store, rows, config.name_match).await?;
            if json {
                println!("{}", serde_json::to_string(&summary)?);
            } else if summary.inserted == 0 {
                println!(
                    "No new data to save: all {} rows already exist.",
                    summary.skipped
                );
            } else {
                println!(
                    "Inserted {} records from {}, skipped {} duplicates.",
                    summary.inserted,
                    csv.display(),
                    summary.skipped
                );
            }
        }
        Commands::Report { out } => {
            match report::build_report(&store, &PageConfig::default()).await {
                Ok(bytes) => {
                    tokio::fs::write(&out, bytes)
                        .await
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!(
                        "Report written to {} ({}).",
                        out.display(),
                        report::REPORT_CONTENT_TYPE
                    );
                }
                Err(LedgerError::EmptyResult) => {
                    println!("No data found to generate report.");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::RequestUpdate { name, out } => {
            let message = notify::request_update(&store, &name, &config.mail_from).await?;
            notify::write_outbox(&message, &out).await?;
            println!("Update request for {} written to {}.", message.to, out.display());
        }
    }

    Ok(())
}
