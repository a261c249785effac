// Application Layer - Use cases and orchestration

pub mod cancel;
pub mod coverer;
pub mod dispatch;
pub mod fanout;
pub mod retry;
pub mod service;

// Re-exports
pub use cancel::{cancel_pair, CancelToken, Canceller};
pub use coverer::{CoverConfig, RegionCoverer};
pub use dispatch::{CountDispatcher, DispatchConfig};
pub use fanout::{FanoutPool, PoolConfig};
pub use retry::{retry, RetryError, RetrySession};
pub use service::{GranuleService, ServiceConfig};
