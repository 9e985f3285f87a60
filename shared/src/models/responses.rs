//! Response envelopes returned by the API

use serde::Serialize;

use crate::models::{GridCellForecast, GridCellMetadata, MetricInfo, MonthMetadata, ValidatedQuery};
use crate::types::CountryCode;

/// Forecast records with their count and the normalized query
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub data: Vec<GridCellForecast>,
    pub count: usize,
    pub query: ValidatedQuery,
}

impl ForecastResponse {
    pub fn new(data: Vec<GridCellForecast>, query: ValidatedQuery) -> Self {
        Self {
            count: data.len(),
            data,
            query,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GridCellsResponse {
    pub data: Vec<GridCellMetadata>,
    pub count: usize,
    /// Distinct countries; only present when the listing was not filtered by country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<CountryCode>>,
}

#[derive(Debug, Serialize)]
pub struct MonthsResponse {
    pub data: Vec<MonthMetadata>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<CountryCode>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub data: Vec<MetricInfo>,
    pub count: usize,
}
