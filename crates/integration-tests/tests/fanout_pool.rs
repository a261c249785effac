//! Fan-out pool end-to-end behavior: scheduling-order independence,
//! retry-backed listings and first-error aborts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use satcover_core::application::{FanoutPool, PoolConfig, RetrySession};
use satcover_core::port::object_store::mocks::MockObjectStore;
use satcover_core::port::{ObjectStore, StoreError};

fn listings() -> MockObjectStore {
    MockObjectStore::with_listings(&[
        (
            "granules/L1C/T32/A",
            &["L1C/T32/A/B02.jp2", "L1C/T32/A/B03.jp2", "L1C/T32/A/B04.jp2"][..],
        ),
        ("granules/L1C/T32/B", &["L1C/T32/B/B02.jp2"][..]),
        (
            "granules/L1C/T33/C",
            &["L1C/T33/C/B02.jp2", "L1C/T33/C/B08.jp2"][..],
        ),
        ("granules/L1C/T33/D", &[][..]),
    ])
}

fn all_links() -> Vec<String> {
    vec![
        "granules/L1C/T32/A".to_string(),
        "granules/L1C/T32/B".to_string(),
        "granules/L1C/T33/C".to_string(),
        "granules/L1C/T33/D".to_string(),
    ]
}

fn expected_set() -> HashSet<String> {
    [
        "L1C/T32/A/B02.jp2",
        "L1C/T32/A/B03.jp2",
        "L1C/T32/A/B04.jp2",
        "L1C/T32/B/B02.jp2",
        "L1C/T33/C/B02.jp2",
        "L1C/T33/C/B08.jp2",
    ]
    .iter()
    .map(|n| format!("granules/{}", n))
    .collect()
}

#[tokio::test]
async fn output_content_is_schedule_independent() {
    // Every worker sizing must produce the same set of links
    for workers in [None, Some(1), Some(2), Some(4), Some(16)] {
        let config = PoolConfig {
            workers,
            dedup: false,
            retry: RetrySession::new(2, Duration::from_millis(1)),
        };
        let pool = FanoutPool::new(Arc::new(listings()), config);
        let collected = pool.collect_images(&all_links()).await.unwrap();

        // 3 + 1 + 2 + 0 objects across the four prefixes
        assert_eq!(collected.len(), 6, "workers={:?}", workers);
        let set: HashSet<String> = collected.into_iter().collect();
        assert_eq!(set, expected_set(), "workers={:?}", workers);
    }
}

#[tokio::test(start_paused = true)]
async fn flaky_store_recovers_within_retry_budget() {
    let store = Arc::new(listings());
    store.fail_next(3);
    let pool = FanoutPool::new(
        store,
        PoolConfig {
            workers: Some(1),
            dedup: false,
            retry: RetrySession::new(4, Duration::from_millis(20)),
        },
    );

    let collected = pool.collect_images(&all_links()).await.unwrap();
    assert_eq!(collected.len(), 6);
}

/// Store whose listings always fail: the pool must surface the wrapped
/// retry error instead of an empty success.
struct BrokenStore;

#[async_trait::async_trait]
impl ObjectStore for BrokenStore {
    async fn list_objects(&self, _bucket: &str, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("link down".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn persistent_failure_aborts_with_attempt_count() {
    let pool = FanoutPool::new(
        Arc::new(BrokenStore),
        PoolConfig {
            workers: None,
            dedup: false,
            retry: RetrySession::new(3, Duration::from_millis(5)),
        },
    );

    let err = pool.collect_images(&all_links()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("3 attempts"), "message: {message}");
    assert!(message.contains("link down"), "message: {message}");
}
