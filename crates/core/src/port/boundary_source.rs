// Boundary Source Port
// Produces a region's boundary as a flat, even-length lat/lng sequence.
// How the polygon text is obtained (remote download, local file) is an
// adapter concern.

use async_trait::async_trait;
use thiserror::Error;

/// Boundary fetching/parsing errors
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Parse failed: {0}")]
    Parse(String),
}

/// Boundary Source trait
#[async_trait]
pub trait BoundarySource: Send + Sync {
    /// Fetch a region's boundary coordinates as a flat lat/lng sequence
    ///
    /// # Errors
    /// - `BoundaryError::RegionNotFound` if the identifier is unknown
    /// - `BoundaryError::Fetch` on transport failures (retryable)
    /// - `BoundaryError::Parse` if the polygon text is malformed
    async fn boundary(&self, region: &str) -> Result<Vec<f64>, BoundaryError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;

    /// Mock Boundary Source serving fixed coordinate sequences
    pub struct MockBoundarySource {
        regions: HashMap<String, Vec<f64>>,
    }

    impl MockBoundarySource {
        pub fn new() -> Self {
            Self {
                regions: HashMap::new(),
            }
        }

        pub fn with_region(mut self, region: impl Into<String>, coords: Vec<f64>) -> Self {
            self.regions.insert(region.into(), coords);
            self
        }
    }

    impl Default for MockBoundarySource {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl BoundarySource for MockBoundarySource {
        async fn boundary(&self, region: &str) -> Result<Vec<f64>, BoundaryError> {
            self.regions
                .get(region)
                .cloned()
                .ok_or_else(|| BoundaryError::RegionNotFound(region.to_string()))
        }
    }
}
