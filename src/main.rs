use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use vendorhub_api as api;

use api::models::{PeriodType, UploadType};
use api::services::{PreviewRequest, ReportRequest};

#[derive(Parser)]
#[command(name = "vendorhub", version, about = "Vendor purchase-order import pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,

    /// Parse a purchase-order file and print its canonical preview
    Preview {
        /// Path to the uploaded file
        file: PathBuf,
        /// Explicit partner hint (skips format detection)
        #[arg(long)]
        partner: Option<String>,
        #[arg(long, default_value = "cli")]
        uploaded_by: String,
    },

    /// Parse a purchase-order file and persist every document in it
    Import {
        file: PathBuf,
        #[arg(long)]
        partner: Option<String>,
        #[arg(long, default_value = "cli")]
        uploaded_by: String,
        /// Blob-storage reference of the retained original file
        #[arg(long)]
        attachment_path: Option<String>,
    },

    /// Import a periodic inventory or secondary-sales report
    ImportReport {
        file: PathBuf,
        #[arg(long)]
        partner: String,
        /// inventory | secondary-sales
        #[arg(long)]
        upload_type: String,
        #[arg(long)]
        business_unit: String,
        /// daily | date-range
        #[arg(long, default_value = "daily")]
        period_type: String,
        #[arg(long)]
        report_date: Option<NaiveDate>,
        #[arg(long)]
        period_start: Option<NaiveDate>,
        #[arg(long)]
        period_end: Option<NaiveDate>,
        #[arg(long, default_value = "cli")]
        uploaded_by: String,
        #[arg(long)]
        attachment_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    match cli.command {
        Command::Migrate => {
            let db = api::db::establish_connection_from_app_config(&cfg).await?;
            api::db::run_migrations(&db).await?;
            info!("migrations applied");
        }

        Command::Preview {
            file,
            partner,
            uploaded_by,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let request = PreviewRequest {
                filename: filename_of(&file),
                uploaded_by,
                partner,
                attachment_path: None,
            };
            let preview =
                api::services::PreviewService::new(cfg.import_policy()).preview(&bytes, &request)?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }

        Command::Import {
            file,
            partner,
            uploaded_by,
            attachment_path,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let state = connect(&cfg).await?;

            let request = PreviewRequest {
                filename: filename_of(&file),
                uploaded_by,
                partner,
                attachment_path,
            };
            let preview = state.services.preview.preview(&bytes, &request)?;
            let outcome = state.services.imports.import_batch(&preview.documents).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "disposition": outcome.disposition(),
                    "outcome": outcome,
                    "warnings": preview.warnings,
                }))?
            );
        }

        Command::ImportReport {
            file,
            partner,
            upload_type,
            business_unit,
            period_type,
            report_date,
            period_start,
            period_end,
            uploaded_by,
            attachment_path,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let state = connect(&cfg).await?;

            let request = ReportRequest {
                partner: api::models::Partner::from_str(&partner)
                    .map_err(|_| anyhow::anyhow!("unknown partner '{}'", partner))?,
                business_unit,
                period_type: PeriodType::from_str(&period_type)
                    .map_err(|_| anyhow::anyhow!("unknown period type '{}'", period_type))?,
                report_date,
                period_start,
                period_end,
                filename: filename_of(&file),
                uploaded_by,
                attachment_path,
            };

            let upload_type = UploadType::from_str(&upload_type)
                .map_err(|_| anyhow::anyhow!("unknown upload type '{}'", upload_type))?;
            let outcome = match upload_type {
                UploadType::Inventory => {
                    state.services.reports.import_inventory(&bytes, &request).await?
                }
                UploadType::SecondarySales => {
                    state.services.reports.import_sales(&bytes, &request).await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

/// Connects to the database, optionally auto-migrating, and wires the
/// service bundle with a logging event drain.
async fn connect(cfg: &api::config::AppConfig) -> anyhow::Result<api::AppState> {
    let db = api::db::establish_connection_from_app_config(cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db).await?;
    }

    let (event_sender, event_rx) = api::events::channel();
    tokio::spawn(api::events::process_events(event_rx));

    Ok(api::AppState::new(
        Arc::new(db),
        cfg.clone(),
        Some(Arc::new(event_sender)),
    ))
}

fn filename_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
