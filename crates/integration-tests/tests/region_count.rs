//! End-to-end region counting flows over mock collaborators:
//! boundary text -> cell cover -> concurrent per-cell counts -> total.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use satcover_core::application::{
    CountDispatcher, CoverConfig, DispatchConfig, FanoutPool, GranuleService, PoolConfig,
    RegionCoverer, RetrySession, ServiceConfig,
};
use satcover_core::domain::CellCover;
use satcover_core::port::boundary_source::mocks::MockBoundarySource;
use satcover_core::port::granule_index::mocks::{MockBehavior, MockGranuleIndex};
use satcover_core::port::object_store::mocks::MockObjectStore;
use satcover_core::port::{GranuleIndex, IndexError};
use satcover_core::AppError;
use satcover_infra_poly::parse_poly_text;

/// The original service's example region: a 1x1 degree box over Oresund
const BOX: [f64; 8] = [55.0, 12.0, 55.0, 13.0, 56.0, 13.0, 56.0, 12.0];

const BOX_POLY: &str = "\
oresund
1
   1.200000E+01   5.500000E+01
   1.300000E+01   5.500000E+01
   1.300000E+01   5.600000E+01
   1.200000E+01   5.600000E+01
END
END
";

fn service_with_index(index: Arc<dyn GranuleIndex>, scale: i64) -> GranuleService {
    let boundary = Arc::new(MockBoundarySource::new().with_region("oresund", BOX.to_vec()));
    let coverer = RegionCoverer::new(CoverConfig {
        max_level: 15,
        max_cells: 100,
    })
    .unwrap();
    let dispatcher = CountDispatcher::new(
        index,
        DispatchConfig {
            images_per_granule: scale,
            concurrency: None,
        },
    );
    let pool = FanoutPool::new(
        Arc::new(MockObjectStore::with_listings(&[])),
        PoolConfig::default(),
    );
    GranuleService::new(
        boundary,
        coverer,
        dispatcher,
        pool,
        ServiceConfig {
            deadline: Some(Duration::from_secs(300)),
            boundary_retry: RetrySession::new(3, Duration::from_millis(1)),
        },
    )
}

#[tokio::test]
async fn boundary_to_cover_to_total() {
    let index = Arc::new(MockGranuleIndex::new_fixed(2));
    let svc = service_with_index(index.clone(), 13);

    let total = svc.count_images_in_region("oresund").await.unwrap();
    let cells = index.call_count() as i64;
    assert!(cells > 0, "cover must be non-empty");
    assert!(cells <= 100, "cover must respect max_cells");
    assert_eq!(total, cells * 2 * 13);
}

#[tokio::test]
async fn three_cell_cover_matches_worked_example() {
    // maxLevel=15, maxCells=100 over the example polygon; per-cell counts
    // {3, 5, 2} must aggregate to (3+5+2) * scale
    let coverer = RegionCoverer::new(CoverConfig {
        max_level: 15,
        max_cells: 100,
    })
    .unwrap();
    let full = coverer.cover(&BOX).unwrap();
    assert!(!full.is_empty());

    let three = CellCover::new(
        [55.2, 55.5, 55.8]
            .iter()
            .map(|lat| {
                h3o::LatLng::new(*lat, 12.5)
                    .unwrap()
                    .to_cell(h3o::Resolution::Six)
            })
            .collect(),
    );
    assert_eq!(three.len(), 3);

    let index = Arc::new(MockGranuleIndex::new_cycle(vec![3, 5, 2]));
    let dispatcher = CountDispatcher::new(index, DispatchConfig::default());
    let total = dispatcher.count_region(&three).await.unwrap();
    assert_eq!(total, (3 + 5 + 2) * 13);
}

#[tokio::test]
async fn poly_text_feeds_the_same_pipeline() {
    let coords = parse_poly_text(BOX_POLY).unwrap();
    assert_eq!(coords.len(), 8);

    let coverer = RegionCoverer::new(CoverConfig::default()).unwrap();
    let cover = coverer.cover(&coords).unwrap();
    assert!(!cover.is_empty());
    for pair in coords.chunks_exact(2) {
        assert!(cover.contains(pair[0], pair[1]));
    }
}

#[tokio::test]
async fn first_failing_cell_aborts_the_whole_count() {
    let index = Arc::new(MockGranuleIndex::new(MockBehavior::FailOn { nth: 0, count: 4 }));
    let svc = service_with_index(index, 13);

    let err = svc.count_images_in_region("oresund").await.unwrap_err();
    assert!(matches!(err, AppError::Index(IndexError::Unavailable(_))));
}

/// Index that stalls forever after a few successes; the deadline must
/// abort it rather than hang the caller.
struct PartiallyStalledIndex {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl GranuleIndex for PartiallyStalledIndex {
    async fn count_granules(
        &self,
        _lat_lo: &str,
        _lng_lo: &str,
        _lat_hi: &str,
        _lng_hi: &str,
    ) -> Result<i64, IndexError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < 2 {
            Ok(1)
        } else {
            std::future::pending().await
        }
    }
}

#[tokio::test(start_paused = true)]
async fn deadline_bounds_a_stuck_backend() {
    let index = Arc::new(PartiallyStalledIndex {
        calls: AtomicUsize::new(0),
    });
    let boundary = Arc::new(MockBoundarySource::new().with_region("oresund", BOX.to_vec()));
    let coverer = RegionCoverer::new(CoverConfig::default()).unwrap();
    let dispatcher = CountDispatcher::new(index, DispatchConfig::default());
    let pool = FanoutPool::new(
        Arc::new(MockObjectStore::with_listings(&[])),
        PoolConfig::default(),
    );
    let svc = GranuleService::new(
        boundary,
        coverer,
        dispatcher,
        pool,
        ServiceConfig {
            deadline: Some(Duration::from_secs(10)),
            boundary_retry: RetrySession::default(),
        },
    );

    let err = svc.count_images_in_region("oresund").await.unwrap_err();
    assert!(matches!(err, AppError::DeadlineExceeded(_)));
}
