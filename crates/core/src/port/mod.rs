// Port Layer - Interfaces for external collaborators

pub mod boundary_source;
pub mod granule_index;
pub mod object_store;

// Re-exports
pub use boundary_source::{BoundaryError, BoundarySource};
pub use granule_index::{GranuleIndex, IndexError};
pub use object_store::{ObjectStore, StoreError};
