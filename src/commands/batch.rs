use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use tokio_util::sync::CancellationToken;

use crate::batch::BatchOrchestrator;
use crate::config::Config;
use crate::utils::progress::BatchProgressDisplay;

#[derive(Debug, Subcommand)]
pub enum BatchAction {
    #[command(about = "Enumerate and classify documents from the remote listing API")]
    Run {
        /// Stop after enqueuing this many documents (default: full enumeration)
        #[arg(long)]
        limit: Option<u64>,

        /// Discard the first N documents from the listing before work begins
        #[arg(long, default_value_t = 0)]
        skip: u64,
    },
}

pub async fn execute(action: &BatchAction) -> Result<()> {
    match action {
        BatchAction::Run { limit, skip } => execute_run(*limit, *skip).await,
    }
}

async fn execute_run(limit: Option<u64>, skip: u64) -> Result<()> {
    let config = Config::load()?;
    let orchestrator = BatchOrchestrator::new(config.orchestrator.clone());

    let display = Arc::new(BatchProgressDisplay::new(limit.unwrap_or(0)));

    let summary = orchestrator
        .run(limit, skip, Some(display), CancellationToken::new())
        .await?;

    println!("\n{}", "📦 Batch Run Summary:".green().bold());
    println!(
        "  {} {}",
        "Total documents:".white().bold(),
        summary.total_documents.to_string().yellow()
    );
    println!(
        "  {} {}",
        "Processed:".white().bold(),
        summary.processed_documents.to_string().yellow()
    );
    println!(
        "  {} {}",
        "Successful jobs:".white().bold(),
        summary.successful_jobs.to_string().green()
    );
    println!(
        "  {} {}",
        "Failed jobs:".white().bold(),
        summary.failed_jobs.to_string().red()
    );
    println!(
        "  {} {}",
        "Skipped:".white().bold(),
        summary.skipped_documents.to_string().yellow()
    );
    println!(
        "  {} {:.1}%",
        "Success rate:".white().bold(),
        summary.success_rate()
    );
    println!(
        "  {} {:.1}/min",
        "Throughput:".white().bold(),
        summary.documents_per_minute()
    );
    println!(
        "  {} {:.1}s",
        "Elapsed:".white().bold(),
        summary.elapsed.as_secs_f64()
    );

    Ok(())
}
