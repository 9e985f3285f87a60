//! HTTP handlers

pub mod forecasts;
pub mod health;
pub mod metadata;

pub use forecasts::{get_forecast_summary, get_forecasts};
pub use health::{health_check, readiness_check, service_info};
pub use metadata::{get_countries, get_grid_cells, get_metrics, get_months};
