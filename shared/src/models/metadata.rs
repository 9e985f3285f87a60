//! Discovery projections of the dataset

use serde::Serialize;

use crate::types::{CountryCode, YearMonth};

/// A grid cell without forecast values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCellMetadata {
    pub grid_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: CountryCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_1_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_2_id: Option<String>,
}

/// Forecast coverage for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMetadata {
    pub month: YearMonth,
    pub forecast_count: usize,
    pub countries: Vec<CountryCode>,
}
