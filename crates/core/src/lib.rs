// satcover Core - Domain Logic & Ports
// NO infrastructure dependencies: cloud clients and boundary fetching
// live behind ports, implemented by collaborator crates.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
