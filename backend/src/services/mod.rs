//! Business logic services for the VIEWS forecast API

pub mod forecast;
pub mod snapshot_cache;

pub use forecast::ForecastService;
pub use snapshot_cache::{LoadError, SnapshotCache};
