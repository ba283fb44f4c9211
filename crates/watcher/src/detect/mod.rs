//! Detectors that turn parsed log records into alert events.

pub mod error_rate;
pub mod pool;

pub use error_rate::ErrorRateDetector;
pub use pool::PoolTracker;
