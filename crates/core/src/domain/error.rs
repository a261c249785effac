// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Odd coordinate count: {0} (coordinates must come in lat/lng pairs)")]
    OddCoordinateCount(usize),

    #[error("Too few boundary points: {0} (a polygon needs at least 3)")]
    TooFewPoints(usize),

    #[error("Invalid coordinate at pair {index}: lat={lat}, lng={lng}")]
    InvalidCoordinate { index: usize, lat: f64, lng: f64 },

    #[error("Invalid cell level: {0} (must be 0..=15)")]
    InvalidLevel(u8),

    #[error("Invalid polygon geometry: {0}")]
    InvalidGeometry(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
