//! Domain models for the forecast query service

mod constraint;
mod forecast;
mod metadata;
mod metrics;
mod query;
mod responses;
mod summary;

pub use constraint::*;
pub use forecast::*;
pub use metadata::*;
pub use metrics::*;
pub use query::*;
pub use responses::*;
pub use summary::*;
