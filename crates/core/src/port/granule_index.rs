// Granule Index Port
// Abstraction over the geo index that counts granules whose bounding box
// overlaps a queried rectangle:
//   lat_lo < north_lat AND south_lat < lat_hi
//   AND lng_lo < east_lon AND west_lon < lng_hi
// Corners travel as strings because the backing clients splice them into
// query text verbatim.

use async_trait::async_trait;
use thiserror::Error;

/// Index query errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Granule Index trait
///
/// Implementations execute the bounding-box count query against the real
/// geo index (e.g. a cloud warehouse holding the granule catalog).
#[async_trait]
pub trait GranuleIndex: Send + Sync {
    /// Count granules whose bounding box overlaps the given rectangle
    ///
    /// # Errors
    /// - `IndexError::Query` if the backend rejects the query
    /// - `IndexError::Unavailable` on transport failures (retryable)
    async fn count_granules(
        &self,
        lat_lo: &str,
        lng_lo: &str,
        lat_hi: &str,
        lng_hi: &str,
    ) -> Result<i64, IndexError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock index behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Every query returns the same count
        Fixed(i64),
        /// Queries return these counts in call order, cycling at the end
        Cycle(Vec<i64>),
        /// Every query fails with this message
        Fail(String),
        /// The nth call (0-based) fails, all others return the count
        FailOn { nth: usize, count: i64 },
    }

    /// Mock Granule Index for testing
    pub struct MockGranuleIndex {
        behavior: MockBehavior,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockGranuleIndex {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_fixed(count: i64) -> Self {
            Self::new(MockBehavior::Fixed(count))
        }

        pub fn new_cycle(counts: Vec<i64>) -> Self {
            Self::new(MockBehavior::Cycle(counts))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl GranuleIndex for MockGranuleIndex {
        async fn count_granules(
            &self,
            _lat_lo: &str,
            _lng_lo: &str,
            _lat_hi: &str,
            _lng_hi: &str,
        ) -> Result<i64, IndexError> {
            let call = {
                let mut guard = self.call_count.lock().unwrap();
                let current = *guard;
                *guard += 1;
                current
            };

            match &self.behavior {
                MockBehavior::Fixed(count) => Ok(*count),
                MockBehavior::Cycle(counts) => Ok(counts[call % counts.len()]),
                MockBehavior::Fail(msg) => Err(IndexError::Query(msg.clone())),
                MockBehavior::FailOn { nth, count } => {
                    if call == *nth {
                        Err(IndexError::Unavailable("mock outage".to_string()))
                    } else {
                        Ok(*count)
                    }
                }
            }
        }
    }
}
