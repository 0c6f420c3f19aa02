use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::taxonomy::BatchJobStatus;

/// Format a batch job status for display.
pub fn format_job_status(status: BatchJobStatus) -> String {
    match status {
        BatchJobStatus::Queued => "⏳ Queued",
        BatchJobStatus::Running => "⚙️ Running",
        BatchJobStatus::Completed => "✅ Completed",
        BatchJobStatus::Failed => "❌ Failed",
        BatchJobStatus::Cancelled => "🚫 Cancelled",
    }
    .to_string()
}

/// Multi-progress bar manager for batch operations: one bar per
/// submitted job plus an overall document-count bar.
pub struct BatchProgressDisplay {
    multi_bar: MultiProgress,
    bars: Arc<RwLock<HashMap<String, ProgressBar>>>,
    overall_bar: ProgressBar,
}

impl BatchProgressDisplay {
    pub fn new(total_documents: u64) -> Self {
        let multi_bar = MultiProgress::new();

        let overall_bar = multi_bar.add(ProgressBar::new(total_documents));
        overall_bar.set_style(
            ProgressStyle::default_bar()
                .template("📦 Overall Progress [{bar:50.cyan/blue}] {pos}/{len} documents ({percent}%) | {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        Self {
            multi_bar,
            bars: Arc::new(RwLock::new(HashMap::new())),
            overall_bar,
        }
    }

    pub async fn add_job(&self, job_id: &str) -> ProgressBar {
        let pb = self.multi_bar.add(ProgressBar::new(100));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:.bold} [{bar:30.green/red}] {percent}% | {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_prefix(format!("🧾 job {}", job_id));

        self.bars.write().await.insert(job_id.to_string(), pb.clone());
        pb
    }

    pub async fn update_job(&self, job_id: &str, percent: u8, message: String) {
        if let Some(pb) = self.bars.read().await.get(job_id) {
            pb.set_position(percent as u64);
            pb.set_message(message);
        }
    }

    pub async fn complete_job(&self, job_id: &str, status: BatchJobStatus, processed: u64) {
        if let Some(pb) = self.bars.read().await.get(job_id) {
            pb.finish_with_message(format_job_status(status));
        }
        self.overall_bar.inc(processed);
    }

    pub fn finish(&self, message: &str) {
        self.overall_bar.finish_with_message(message.to_string());
    }
}

/// Create a spinner for indeterminate operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
