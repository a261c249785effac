// Domain Layer - Pure types and validation

pub mod coordinate;
pub mod cover;
pub mod error;
pub mod links;

pub use coordinate::{pair_coordinates, Coordinate};
pub use cover::{BoundingBox, CellCover};
pub use error::DomainError;
pub use links::{dedup_links, Links};
