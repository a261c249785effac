// Cell Count Dispatcher
// One concurrent count query per cell in a cover, aggregated into a
// single total. First error wins: it cancels sibling tasks and aborts
// the aggregate, discarding partial sums.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use crate::application::cancel::cancel_pair;
use crate::domain::{BoundingBox, CellCover};
use crate::error::{AppError, Result};
use crate::port::{GranuleIndex, IndexError};

/// Dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Assumed average image objects per granule. The true per-granule
    /// image count is not queried; the aggregate is scaled by this
    /// empirical figure, a deliberate approximation.
    pub images_per_granule: i64,
    /// Cap on concurrently running cell queries. `None` preserves the
    /// historical unbounded fan-out (one in-flight task per cell).
    pub concurrency: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            images_per_granule: 13,
            concurrency: None,
        }
    }
}

/// Dispatches per-cell bounding-box count queries and sums the results
pub struct CountDispatcher {
    index: Arc<dyn GranuleIndex>,
    config: DispatchConfig,
}

impl CountDispatcher {
    pub fn new(index: Arc<dyn GranuleIndex>, config: DispatchConfig) -> Self {
        Self { index, config }
    }

    /// Count images across a region cover
    ///
    /// Spawns one task per cell, each converting its cell's bounding
    /// rectangle to corner strings and invoking the count query. Results
    /// are summed commutatively over exactly `cover.len()` iterations;
    /// the first error cancels the remaining tasks and is returned.
    /// The total is the granule sum scaled by `images_per_granule` and is
    /// an upper-bound estimate, not an exact audit (cells can overlap
    /// granule bounding boxes).
    pub async fn count_region(&self, cover: &CellCover) -> Result<i64> {
        let jobs = cover.len();
        if jobs == 0 {
            return Ok(0);
        }

        let (result_tx, mut result_rx) = mpsc::channel::<i64>(jobs);
        let (error_tx, mut error_rx) = mpsc::channel::<IndexError>(jobs);
        let (canceller, token) = cancel_pair();
        let limiter = self
            .config
            .concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        for cell in cover.iter() {
            let bbox = BoundingBox::of_cell(cell);
            let index = Arc::clone(&self.index);
            let result_tx = result_tx.clone();
            let error_tx = error_tx.clone();
            let mut token = token.clone();
            let limiter = limiter.clone();

            tokio::spawn(async move {
                let _permit = match &limiter {
                    Some(semaphore) => match semaphore.acquire().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return,
                    },
                    None => None,
                };
                if token.is_cancelled() {
                    return;
                }

                // Corner strings must outlive the borrowed query future
                let (lat_lo, lng_lo) = (bbox.lat_lo.to_string(), bbox.lng_lo.to_string());
                let (lat_hi, lng_hi) = (bbox.lat_hi.to_string(), bbox.lng_hi.to_string());
                let query = index.count_granules(&lat_lo, &lng_lo, &lat_hi, &lng_hi);
                tokio::select! {
                    outcome = query => match outcome {
                        Ok(count) => {
                            let _ = result_tx.send(count).await;
                        }
                        Err(err) => {
                            let _ = error_tx.send(err).await;
                        }
                    },
                    _ = token.cancelled() => {}
                }
            });
        }
        drop(result_tx);
        drop(error_tx);

        let mut granule_count: i64 = 0;
        for _ in 0..jobs {
            tokio::select! {
                Some(err) = error_rx.recv() => {
                    error!(error = %err, "Cell count query failed, aborting aggregate");
                    canceller.cancel();
                    return Err(AppError::Index(err));
                }
                Some(count) = result_rx.recv() => {
                    granule_count += count;
                }
                else => break,
            }
        }

        info!(granules = granule_count, cells = jobs, "Granules in region cover");
        Ok(granule_count * self.config.images_per_granule)
    }
}
