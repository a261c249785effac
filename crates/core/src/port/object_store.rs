// Object Store Port
// Abstraction over bucket storage listing: enumerate all object names
// under a prefix. The core reconstructs full URLs as `bucket + "/" + name`.

use async_trait::async_trait;
use thiserror::Error;

/// Storage listing errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Listing failed: {0}")]
    Listing(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Object Store trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all object names under a prefix
    ///
    /// # Errors
    /// - `StoreError::BucketNotFound` if the bucket does not exist
    /// - `StoreError::Unavailable` on transport failures (retryable)
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock Object Store for testing
    ///
    /// Maps `bucket/prefix` keys to object name listings. Unknown keys
    /// fail, or a failure budget can make the first N calls fail before
    /// succeeding (for retry tests).
    pub struct MockObjectStore {
        listings: HashMap<String, Vec<String>>,
        failures_before_success: Arc<Mutex<usize>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockObjectStore {
        pub fn new(listings: HashMap<String, Vec<String>>) -> Self {
            Self {
                listings,
                failures_before_success: Arc::new(Mutex::new(0)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Build from `(link, objects)` pairs where link is `bucket/prefix`
        pub fn with_listings(entries: &[(&str, &[&str])]) -> Self {
            let listings = entries
                .iter()
                .map(|(link, names)| {
                    (
                        link.to_string(),
                        names.iter().map(|n| n.to_string()).collect(),
                    )
                })
                .collect();
            Self::new(listings)
        }

        /// Make the next `n` calls fail with `Unavailable` before serving
        pub fn fail_next(&self, n: usize) {
            *self.failures_before_success.lock().unwrap() = n;
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl ObjectStore for MockObjectStore {
        async fn list_objects(
            &self,
            bucket: &str,
            prefix: &str,
        ) -> Result<Vec<String>, StoreError> {
            *self.call_count.lock().unwrap() += 1;

            {
                let mut budget = self.failures_before_success.lock().unwrap();
                if *budget > 0 {
                    *budget -= 1;
                    return Err(StoreError::Unavailable("mock outage".to_string()));
                }
            }

            let key = if prefix.is_empty() {
                bucket.to_string()
            } else {
                format!("{}/{}", bucket, prefix)
            };
            self.listings
                .get(&key)
                .cloned()
                .ok_or_else(|| StoreError::BucketNotFound(key))
        }
    }
}
