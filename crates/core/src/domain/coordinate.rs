// Coordinate Domain Model
// Boundary data arrives as a flat float sequence; pairs are formed
// positionally (index 0,1 = point 0; 2,3 = point 1; ...).

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// A (latitude, longitude) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    ///
    /// Latitude must be in [-90, 90], longitude in [-180, 180], both finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(DomainError::InvalidCoordinate { index: 0, lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// Pair a flat lat/lng sequence into coordinates
///
/// # Errors
/// - `DomainError::OddCoordinateCount` if the sequence length is odd
/// - `DomainError::TooFewPoints` if fewer than 3 points result
/// - `DomainError::InvalidCoordinate` if a pair is out of range or non-finite
pub fn pair_coordinates(flat: &[f64]) -> Result<Vec<Coordinate>> {
    if flat.len() % 2 != 0 {
        return Err(DomainError::OddCoordinateCount(flat.len()));
    }

    let mut points = Vec::with_capacity(flat.len() / 2);
    for (index, pair) in flat.chunks_exact(2).enumerate() {
        let (lat, lng) = (pair[0], pair[1]);
        let coord = Coordinate::new(lat, lng)
            .map_err(|_| DomainError::InvalidCoordinate { index, lat, lng })?;
        points.push(coord);
    }

    if points.len() < 3 {
        return Err(DomainError::TooFewPoints(points.len()));
    }
    Ok(points)
}
