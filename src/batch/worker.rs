//! A single worker task: pulls document slices off the shared job
//! channel, submits them as batch jobs, and polls each to a terminal
//! status (spec.md §4.7 "Worker loop").

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::client::BatchApiClient;
use super::{BatchCounters, RateLimiter};
use crate::taxonomy::BatchJobStatus;
use crate::utils::progress::BatchProgressDisplay;

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(10);
const JOB_WALL_CLOCK_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[allow(clippy::too_many_arguments)]
pub async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Vec<String>>>>,
    semaphore: Arc<Semaphore>,
    rate_limiter: Arc<RateLimiter>,
    client: Arc<BatchApiClient>,
    counters: Arc<BatchCounters>,
    progress: Option<Arc<BatchProgressDisplay>>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let slice = {
            let mut rx = receiver.lock().await;
            rx.recv().await
        };

        let Some(slice) = slice else {
            break;
        };
        let slice_len = slice.len() as u64;

        let permit = tokio::select! {
            permit = semaphore.clone().acquire_owned() => permit.expect("semaphore closed"),
            _ = cancel.cancelled() => break,
        };

        tokio::select! {
            _ = rate_limiter.wait_for_tick() => {},
            _ = cancel.cancelled() => break,
        }

        match client.submit_batch(&slice).await {
            Err(e) => {
                warn!(worker_id, error = %e, "batch submission failed");
                counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            }
            Ok(submission) => {
                if let Some(display) = &progress {
                    display.add_job(&submission.job_id).await;
                }

                let terminal =
                    poll_until_terminal(&client, &submission.job_id, progress.as_deref(), &cancel).await;
                counters.processed_documents.fetch_add(slice_len, Ordering::Relaxed);

                let (job_status, succeeded) = match &terminal {
                    Some(status) if status.status == "completed" => (BatchJobStatus::Completed, true),
                    Some(status) if status.status == "cancelled" => (BatchJobStatus::Cancelled, false),
                    Some(_) => (BatchJobStatus::Failed, false),
                    None => (BatchJobStatus::Failed, false),
                };

                if succeeded {
                    counters.successful_jobs.fetch_add(1, Ordering::Relaxed);
                    info!(worker_id, job_id = %submission.job_id, "batch job completed");
                } else {
                    counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
                    warn!(worker_id, job_id = %submission.job_id, "batch job did not complete successfully");
                }

                if let Some(display) = &progress {
                    display.complete_job(&submission.job_id, job_status, slice_len).await;
                }
            }
        }

        drop(permit);
    }
}

/// Polls the job-status endpoint until a terminal status is reached or
/// the 30-minute wall-clock timeout elapses. Returns `None` on timeout
/// or cancellation.
async fn poll_until_terminal(
    client: &BatchApiClient,
    job_id: &str,
    progress: Option<&BatchProgressDisplay>,
    cancel: &CancellationToken,
) -> Option<super::client::BatchStatusResponse> {
    let deadline = tokio::time::Instant::now() + JOB_WALL_CLOCK_TIMEOUT;

    loop {
        if cancel.is_cancelled() {
            return None;
        }

        match client.poll_status(job_id).await {
            Ok(status) if status.is_terminal() => return Some(status),
            Ok(status) => {
                if let Some(display) = progress {
                    display
                        .update_job(job_id, status.progress.percent_complete.clamp(0.0, 100.0) as u8, status.status.clone())
                        .await;
                }
            }
            Err(e) => {
                warn!(job_id, error = %e, "status poll failed, will retry");
            }
        }

        if tokio::time::Instant::now() >= deadline {
            warn!(job_id, "batch job timed out waiting for terminal status");
            return None;
        }

        tokio::select! {
            _ = tokio::time::sleep(STATUS_POLL_INTERVAL) => {},
            _ = cancel.cancelled() => return None,
        }
    }
}
