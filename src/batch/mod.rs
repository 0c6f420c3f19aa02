//! Drives classification of a large document population exposed
//! through an external document-listing API (spec.md §4.7). Two
//! enumeration modes are supported: bounded count (`max_documents`
//! caps how many documents are enqueued) and full enumeration
//! (paginate until the listing reports `has_more = false`).

pub mod client;
pub mod worker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::OrchestratorConfig;
use crate::utils::progress::BatchProgressDisplay;
use client::BatchApiClient;

const JOB_CHANNEL_CAPACITY: usize = 10;

#[derive(Debug, Default)]
pub struct BatchCounters {
    pub total_documents: AtomicU64,
    pub processed_documents: AtomicU64,
    pub successful_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
    pub skipped_documents: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total_documents: u64,
    pub processed_documents: u64,
    pub successful_jobs: u64,
    pub failed_jobs: u64,
    pub skipped_documents: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn success_rate(&self) -> f64 {
        let attempted = self.successful_jobs + self.failed_jobs;
        if attempted == 0 {
            0.0
        } else {
            self.successful_jobs as f64 / attempted as f64 * 100.0
        }
    }

    pub fn documents_per_minute(&self) -> f64 {
        let minutes = self.elapsed.as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            0.0
        } else {
            self.processed_documents as f64 / minutes
        }
    }
}

/// Shared process-wide rate limiter: workers serialize on the interval
/// tick by taking turns through the mutex, which gives arrival-order
/// delivery of ticks (spec.md §5 "Ordering guarantees").
pub struct RateLimiter {
    interval: Mutex<tokio::time::Interval>,
}

impl RateLimiter {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        let per_tick = if rate_limit_per_minute == 0 {
            Duration::from_secs(60)
        } else {
            Duration::from_secs_f64(60.0 / rate_limit_per_minute as f64).max(Duration::from_millis(1))
        };
        Self {
            interval: Mutex::new(tokio::time::interval(per_tick)),
        }
    }

    pub async fn wait_for_tick(&self) {
        let mut guard = self.interval.lock().await;
        guard.tick().await;
    }
}

pub struct BatchOrchestrator {
    config: OrchestratorConfig,
    client: Arc<BatchApiClient>,
}

impl BatchOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        let client = Arc::new(BatchApiClient::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        ));
        Self { config, client }
    }

    /// Runs the orchestrator. `max_documents` bounds enumeration (bounded
    /// count mode) when set; `None` enumerates the full listing. `skip`
    /// discards that many documents from the front of the listing before
    /// work begins. `progress`, if given, gets one bar per submitted
    /// batch job plus the overall document-count bar (the teacher's
    /// `indicatif` `MultiProgress` style).
    pub async fn run(
        &self,
        max_documents: Option<u64>,
        skip: u64,
        progress: Option<Arc<BatchProgressDisplay>>,
        cancel: CancellationToken,
    ) -> Result<BatchSummary> {
        let start = Instant::now();
        let counters = Arc::new(BatchCounters::default());
        let rate_limiter = Arc::new(RateLimiter::new(self.config.rate_limit_per_minute));

        let (tx, rx) = mpsc::channel::<Vec<String>>(JOB_CHANNEL_CAPACITY);
        let rx = Arc::new(Mutex::new(rx));
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));

        let mut workers = Vec::with_capacity(self.config.max_workers);
        for worker_id in 0..self.config.max_workers {
            workers.push(tokio::spawn(worker::run_worker(
                worker_id,
                Arc::clone(&rx),
                Arc::clone(&semaphore),
                Arc::clone(&rate_limiter),
                Arc::clone(&self.client),
                Arc::clone(&counters),
                progress.clone(),
                cancel.clone(),
            )));
        }

        self.enumerate(tx, max_documents, skip, &counters, cancel.clone()).await?;

        for worker in workers {
            let _ = worker.await;
        }

        if let Some(display) = &progress {
            display.finish("batch run complete");
        }

        Ok(BatchSummary {
            total_documents: counters.total_documents.load(Ordering::Relaxed),
            processed_documents: counters.processed_documents.load(Ordering::Relaxed),
            successful_jobs: counters.successful_jobs.load(Ordering::Relaxed),
            failed_jobs: counters.failed_jobs.load(Ordering::Relaxed),
            skipped_documents: counters.skipped_documents.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        })
    }

    async fn enumerate(
        &self,
        tx: mpsc::Sender<Vec<String>>,
        max_documents: Option<u64>,
        skip: u64,
        counters: &BatchCounters,
        cancel: CancellationToken,
    ) -> Result<()> {
        let page_limit = self.config.batch_size * 2;
        let mut cursor: Option<String> = None;
        let mut remaining_skip = skip;
        let mut enqueued: u64 = 0;
        let inter_page_delay = Duration::from_secs_f64(
            60.0 / self.config.rate_limit_per_minute.max(1) as f64 * self.config.batch_size as f64,
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let page = self.client.list_documents(page_limit, cursor.as_deref()).await?;
            let mut paths: Vec<String> = page.documents.iter().map(|d| d.path.clone()).collect();

            if remaining_skip > 0 {
                let drop_count = remaining_skip.min(paths.len() as u64) as usize;
                paths.drain(..drop_count);
                counters.skipped_documents.fetch_add(drop_count as u64, Ordering::Relaxed);
                remaining_skip -= drop_count as u64;
            }

            if let Some(limit) = max_documents {
                let remaining_budget = limit.saturating_sub(enqueued);
                if (paths.len() as u64) > remaining_budget {
                    paths.truncate(remaining_budget as usize);
                }
            }

            counters.total_documents.fetch_add(paths.len() as u64, Ordering::Relaxed);
            enqueued += paths.len() as u64;

            for slice in paths.chunks(self.config.batch_size) {
                if tx.send(slice.to_vec()).await.is_err() {
                    break;
                }
            }

            let reached_bound = max_documents.is_some_and(|limit| enqueued >= limit);
            if !page.has_more || reached_bound {
                break;
            }

            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(inter_page_delay) => {},
                _ = cancel.cancelled() => break,
            }
        }

        info!(enqueued, "document enumeration complete");
        Ok(())
    }

    /// Per-document sequential mode (spec.md §4.7): downloads and
    /// categorises one document at a time instead of submitting batch
    /// jobs, retrying transport 5xx errors up to `retry_attempts`.
    pub async fn run_sequential(
        &self,
        documents: &[client::DocumentListing],
        cancel: CancellationToken,
    ) -> BatchSummary {
        let start = Instant::now();
        let counters = BatchCounters::default();

        for doc in documents {
            if cancel.is_cancelled() {
                break;
            }

            let mut attempt = 0;
            let outcome = loop {
                attempt += 1;
                match self.client.download_file(&doc.path).await {
                    Ok(bytes) => match self.client.categorise(&doc.filename, bytes).await {
                        Ok(response) if response.success => break true,
                        Ok(_) | Err(_) if attempt < self.config.retry_attempts => {
                            tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
                            continue;
                        }
                        _ => break false,
                    },
                    Err(_) if attempt < self.config.retry_attempts => {
                        tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
                        continue;
                    }
                    Err(_) => break false,
                }
            };

            counters.processed_documents.fetch_add(1, Ordering::Relaxed);
            if outcome {
                counters.successful_jobs.fetch_add(1, Ordering::Relaxed);
            } else {
                counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            }
        }

        BatchSummary {
            total_documents: documents.len() as u64,
            processed_documents: counters.processed_documents.load(Ordering::Relaxed),
            successful_jobs: counters.successful_jobs.load(Ordering::Relaxed),
            failed_jobs: counters.failed_jobs.load(Ordering::Relaxed),
            skipped_documents: 0,
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_zero_with_no_attempts() {
        let summary = BatchSummary {
            total_documents: 0,
            processed_documents: 0,
            successful_jobs: 0,
            failed_jobs: 0,
            skipped_documents: 0,
            elapsed: Duration::from_secs(0),
        };
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn success_rate_computes_percentage() {
        let summary = BatchSummary {
            total_documents: 210,
            processed_documents: 210,
            successful_jobs: 4,
            failed_jobs: 1,
            skipped_documents: 0,
            elapsed: Duration::from_secs(60),
        };
        assert!((summary.success_rate() - 80.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn rate_limiter_delivers_ticks() {
        let limiter = RateLimiter::new(6_000); // 100 ticks/sec
        limiter.wait_for_tick().await;
        limiter.wait_for_tick().await;
    }
}
