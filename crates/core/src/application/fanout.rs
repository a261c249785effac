// Fan-out Pool
// Enumerates image objects under a set of per-location base-URL links.
// Jobs go onto a channel which is then closed; workers pull until the
// channel drains and each sends exactly one aggregate result back.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use crate::application::cancel::{cancel_pair, CancelToken};
use crate::application::retry::{retry, RetrySession};
use crate::domain::{dedup_links, Links};
use crate::error::{AppError, Result};
use crate::port::ObjectStore;

/// Pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Worker count. `None` preserves the historical one-worker-per-link
    /// sizing; a fixed cap bounds parallelism below the job count.
    pub workers: Option<usize>,
    /// De-duplicate the flattened link list after aggregation. Off by
    /// default: overlapping cells listing the same granule twice is an
    /// accepted approximation of the source system.
    pub dedup: bool,
    /// Backoff policy for failed listings
    pub retry: RetrySession,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: None,
            dedup: false,
            retry: RetrySession::default(),
        }
    }
}

/// Per-worker aggregate: all links it listed, or its first fatal error
type WorkerResult = std::result::Result<Links, AppError>;

/// Worker pool listing image objects under base-URL links concurrently
pub struct FanoutPool {
    store: Arc<dyn ObjectStore>,
    config: PoolConfig,
}

impl FanoutPool {
    pub fn new(store: Arc<dyn ObjectStore>, config: PoolConfig) -> Self {
        Self { store, config }
    }

    /// Collect the flattened union of all objects under each link's prefix
    ///
    /// Spawns `workers` workers (default: one per link) over a shared job
    /// channel. Each worker splits its link into bucket and prefix at the
    /// first `/`, lists objects (retrying per the pool's backoff policy),
    /// and reports one aggregate result when the jobs are exhausted. The
    /// orchestrator reads exactly `workers` results; the first error
    /// cancels the remaining workers and is returned. Output ordering
    /// across links follows worker scheduling and is not guaranteed.
    pub async fn collect_images(&self, links: &[String]) -> Result<Links> {
        let jobs = links.len();
        if jobs == 0 {
            return Ok(Links::new());
        }
        let workers = self.config.workers.unwrap_or(jobs).clamp(1, jobs);

        let (job_tx, job_rx) = mpsc::channel::<String>(jobs);
        let (result_tx, mut result_rx) = mpsc::channel::<WorkerResult>(workers);
        let (canceller, token) = cancel_pair();

        for link in links {
            // Capacity equals the job count, so this never blocks
            let _ = job_tx.send(link.clone()).await;
        }
        drop(job_tx); // Close to signal this is all the work

        let job_rx = Arc::new(Mutex::new(job_rx));
        for worker_id in 0..workers {
            let store = Arc::clone(&self.store);
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let token = token.clone();
            let retry_session = self.config.retry;

            tokio::spawn(async move {
                let outcome = run_worker(worker_id, store, job_rx, token, retry_session).await;
                let _ = result_tx.send(outcome).await;
            });
        }
        drop(result_tx);

        let mut collected = Links::new();
        for _ in 0..workers {
            match result_rx.recv().await {
                Some(Ok(mut links)) => collected.append(&mut links),
                Some(Err(err)) => {
                    error!(error = %err, "Fan-out worker failed, aborting");
                    canceller.cancel();
                    return Err(err);
                }
                None => break,
            }
        }

        if self.config.dedup {
            collected = dedup_links(&collected);
        }
        Ok(collected)
    }
}

/// Drain jobs from the shared channel, listing each link's objects
async fn run_worker(
    worker_id: usize,
    store: Arc<dyn ObjectStore>,
    jobs: Arc<Mutex<mpsc::Receiver<String>>>,
    token: CancelToken,
    retry_session: RetrySession,
) -> WorkerResult {
    let mut collected = Links::new();
    loop {
        if token.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        let job = { jobs.lock().await.recv().await };
        let Some(link) = job else {
            debug!(worker_id, links = collected.len(), "Worker drained job queue");
            return Ok(collected);
        };

        let (bucket, prefix) = split_link(&link);
        let names = retry(retry_session, token.clone(), || {
            store.list_objects(bucket, prefix)
        })
        .await
        .map_err(AppError::from_retry)?;

        collected.extend(names.into_iter().map(|name| format!("{}/{}", bucket, name)));
    }
}

/// Split a base-URL link into bucket name and object prefix
///
/// `bucket/some/prefix` -> (`bucket`, `some/prefix`); a link without a
/// `/` is a bare bucket with an empty prefix.
fn split_link(link: &str) -> (&str, &str) {
    match link.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix.trim_matches('/')),
        None => (link, ""),
    }
}
