//! Aggregate statistics over a result set

use serde::Serialize;

use crate::types::{CountryCode, YearMonth};

/// Statistics of the MAP metric, rounded to two decimals.
///
/// `min_map` and `max_map` are `None` when no record carried a MAP value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub avg_map: f64,
    pub min_map: Option<f64>,
    pub max_map: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub count: usize,
    pub countries: Vec<CountryCode>,
    pub months: Vec<YearMonth>,
    pub grid_cells: usize,
    pub metrics_summary: MapSummary,
}
