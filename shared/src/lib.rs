//! Shared types and query engine for the VIEWS forecast API
//!
//! Holds the record model, query validation, filter evaluation and
//! aggregation. Used by the HTTP backend and by the WASM bindings.

pub mod error;
pub mod filter;
pub mod metadata;
pub mod models;
pub mod snapshot;
pub mod summary;
pub mod types;
pub mod validation;

pub use error::*;
pub use filter::evaluate;
pub use models::*;
pub use snapshot::{ForecastSnapshot, MetricSchema};
pub use summary::summarize;
pub use types::*;
pub use validation::*;
