// Granule Service
// Facade wiring boundary fetch -> region cover -> count dispatch, plus
// the link fan-out entry point, under an optional whole-operation
// deadline.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::cancel::CancelToken;
use crate::application::coverer::RegionCoverer;
use crate::application::dispatch::CountDispatcher;
use crate::application::fanout::FanoutPool;
use crate::application::retry::{retry, RetrySession};
use crate::domain::Links;
use crate::error::{AppError, Result};
use crate::port::BoundarySource;

/// Service-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Wall-clock deadline for a whole operation. Expiry aborts in-flight
    /// work instead of letting it outlive the caller.
    pub deadline: Option<Duration>,
    /// Backoff policy for boundary fetches
    pub boundary_retry: RetrySession,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            deadline: Some(Duration::from_secs(300)),
            boundary_retry: RetrySession::default(),
        }
    }
}

/// Answers region-level granule questions through the configured ports
///
/// # Accuracy
///
/// Returned counts are upper-bound estimates, not exact audits:
/// - the cell cover over-includes area outside the region polygon,
/// - granules straddling two cover cells are counted once per cell,
/// - the per-granule image count is an assumed average
///   (`DispatchConfig::images_per_granule`), not a query result.
pub struct GranuleService {
    boundary: Arc<dyn BoundarySource>,
    coverer: RegionCoverer,
    dispatcher: CountDispatcher,
    pool: FanoutPool,
    config: ServiceConfig,
}

impl GranuleService {
    pub fn new(
        boundary: Arc<dyn BoundarySource>,
        coverer: RegionCoverer,
        dispatcher: CountDispatcher,
        pool: FanoutPool,
        config: ServiceConfig,
    ) -> Self {
        Self {
            boundary,
            coverer,
            dispatcher,
            pool,
            config,
        }
    }

    /// Estimate how many satellite images cover a region
    ///
    /// Fetches the region's boundary (retried per the service's backoff
    /// policy), approximates it as a cell cover, and fans out one count
    /// query per cell.
    pub async fn count_images_in_region(&self, region: &str) -> Result<i64> {
        self.with_deadline(async {
            let coords = retry(self.config.boundary_retry, CancelToken::never(), || {
                self.boundary.boundary(region)
            })
            .await
            .map_err(AppError::from_retry)?;

            let cover = self.coverer.cover(&coords)?;
            info!(region, cells = cover.len(), "Region cover ready");

            self.dispatcher.count_region(&cover).await
        })
        .await
    }

    /// Enumerate all image objects under a set of base-URL links
    pub async fn images_under_links(&self, links: &[String]) -> Result<Links> {
        self.with_deadline(self.pool.collect_images(links)).await
    }

    // Expiry drops `fut`, which drops the stage's canceller and thereby
    // cancels its spawned tasks; see `cancel::CancelToken`.
    async fn with_deadline<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .unwrap_or(Err(AppError::DeadlineExceeded(deadline))),
            None => fut.await,
        }
    }
}
